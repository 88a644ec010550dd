//! Population statistics over `f64` series.
//!
//! Every function divides by N, not N - 1. A series whose values are all
//! identical has a variance of exactly zero, so callers can test for degenerate
//! input with `==` instead of an arbitrary tolerance.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance.
pub fn population_variance(values: &[f64]) -> Option<f64> {
    if is_constant(values)? {
        return Some(0.0);
    }
    let avg = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - avg) * (v - avg)).sum();
    Some(sum_sq / values.len() as f64)
}

/// Population standard deviation.
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    population_variance(values).map(f64::sqrt)
}

/// Population covariance of two series of equal length.
pub fn population_covariance(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() {
        return None;
    }
    let mean_x = mean(xs)?;
    let mean_y = mean(ys)?;
    let sum: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    Some(sum / xs.len() as f64)
}

/// Compounds growth ratios. The empty product is 1.
pub fn product(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().product()
}

fn is_constant(values: &[f64]) -> Option<bool> {
    let first = values.first()?;
    Some(values.iter().all(|v| v == first))
}
