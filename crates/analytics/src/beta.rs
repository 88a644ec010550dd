use crate::error::{finite, MetricError};
use crate::math::{population_covariance, population_variance};

/// Population variance of the benchmark growth ratios.
///
/// Computed once per run and shared by every instrument's beta. A flat benchmark
/// has no variance and therefore no beta for anyone.
pub fn market_variance(benchmark: &[f64]) -> Result<f64, MetricError> {
    match population_variance(benchmark) {
        Some(variance) if variance > 0.0 => finite(variance),
        _ => Err(MetricError::ZeroVariance),
    }
}

/// `cov(instrument, benchmark) / var(benchmark)`, both population statistics.
pub fn beta(
    instrument: &[f64],
    benchmark: &[f64],
    market_variance: Result<f64, MetricError>,
) -> Result<f64, MetricError> {
    let variance = market_variance?;
    // Both columns come from the same return matrix, so they are equally long
    // and non-empty whenever the market variance exists.
    debug_assert_eq!(instrument.len(), benchmark.len());
    let covariance =
        population_covariance(instrument, benchmark).ok_or(MetricError::NonFinite)?;
    finite(covariance / variance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn benchmark_against_itself_is_one() {
        let benchmark = [1.02, 0.97, 1.05, 0.99, 1.01, 0.96];
        let variance = market_variance(&benchmark);
        let b = beta(&benchmark, &benchmark, variance).unwrap();
        assert!((b - 1.0).abs() < 1e-12);
    }

    #[test]
    fn scaled_moves_scale_beta() {
        let benchmark = [1.02, 0.98, 1.04, 0.96];
        // Twice the benchmark's excursions around the same centre.
        let levered: Vec<f64> = benchmark.iter().map(|r| 1.0 + 2.0 * (r - 1.0)).collect();
        let b = beta(&levered, &benchmark, market_variance(&benchmark)).unwrap();
        assert!((b - 2.0).abs() < 1e-9);
    }

    #[test]
    fn uses_population_not_sample_statistics() {
        let benchmark = [1.1, 0.9];
        // Population variance of [1.1, 0.9] is 0.01; the sample variance would be 0.02.
        assert!((market_variance(&benchmark).unwrap() - 0.01).abs() < 1e-12);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn columns_of_different_lengths_are_rejected() {
        let benchmark = [1.02, 0.98, 1.04];
        let _ = beta(&[1.01, 0.99], &benchmark, market_variance(&benchmark));
    }

    #[test]
    fn flat_benchmark_has_zero_variance() {
        assert_eq!(market_variance(&[1.0, 1.0, 1.0]), Err(MetricError::ZeroVariance));
        assert_eq!(
            beta(&[1.1, 0.9, 1.0], &[1.0, 1.0, 1.0], market_variance(&[1.0, 1.0, 1.0])),
            Err(MetricError::ZeroVariance)
        );
    }
}
