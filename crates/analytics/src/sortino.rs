use crate::error::{finite, MetricError};
use crate::math::{population_std_dev, product};
use configuration::AnalysisParams;
use serde::Serialize;

/// Downside-risk statistics of one instrument over the whole window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SortinoStats {
    /// Population standard deviation of per-period returns, annualized.
    pub std_dev_annualized: Result<f64, MetricError>,
    pub downside_deviation_period: Result<f64, MetricError>,
    pub downside_deviation_annualized: Result<f64, MetricError>,
    /// Product of every growth ratio in the window.
    pub cumulative_growth: Result<f64, MetricError>,
    /// `cumulative_growth ^ (periods_per_year / total_periods) - 1`.
    pub cumulative_return_annualized: Result<f64, MetricError>,
    /// `(annualized return - annual MAR) / annualized downside deviation`.
    pub ratio: Result<f64, MetricError>,
}

/// One row of the per-period working behind a Sortino ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SortinoPeriod {
    /// `growth ratio - 1`.
    pub period_return: f64,
    /// `min(0, period_return - per-period MAR)`.
    pub downside_return: f64,
    /// Growth compounded up to and including this period.
    pub cumulative_growth: f64,
}

/// Computes the Sortino ratio of a growth-ratio series.
///
/// Periods at or above the per-period minimum acceptable return contribute a
/// zero shortfall, and every period counts toward the downside deviation's N.
pub fn sortino(growth: &[f64], params: &AnalysisParams) -> SortinoStats {
    let periods_per_year = params.periods_per_year();
    let annualizer = periods_per_year.sqrt();

    let returns: Vec<f64> = growth.iter().map(|g| g - 1.0).collect();
    let shortfalls: Vec<f64> = downside_returns(&returns, params.min_acceptable_return_per_period());

    let std_dev_annualized = population_std_dev(&returns)
        .ok_or(MetricError::NonFinite)
        .and_then(|sd| finite(sd * annualizer));

    let downside_deviation_period = population_std_dev(&shortfalls)
        .ok_or(MetricError::NonFinite)
        .and_then(finite);
    let downside_deviation_annualized =
        downside_deviation_period.and_then(|dd| finite(dd * annualizer));

    let cumulative_growth = finite(product(growth.iter().copied()));
    let cumulative_return_annualized = if growth.is_empty() {
        Err(MetricError::NonFinite)
    } else {
        cumulative_growth
            .and_then(|cg| finite(cg.powf(periods_per_year / growth.len() as f64) - 1.0))
    };

    let ratio = match (cumulative_return_annualized, downside_deviation_annualized) {
        (_, Ok(dd)) if dd == 0.0 => Err(MetricError::ZeroDownsideDeviation),
        (Ok(annual_return), Ok(dd)) => finite((annual_return - params.min_acceptable_return) / dd),
        (Err(e), _) | (_, Err(e)) => Err(e),
    };

    SortinoStats {
        std_dev_annualized,
        downside_deviation_period,
        downside_deviation_annualized,
        cumulative_growth,
        cumulative_return_annualized,
        ratio,
    }
}

/// The per-period working of [`sortino`], for presentation alongside the ratio.
pub fn sortino_detail(growth: &[f64], params: &AnalysisParams) -> Vec<SortinoPeriod> {
    let mar = params.min_acceptable_return_per_period();
    let mut cumulative_growth = 1.0;
    growth
        .iter()
        .map(|g| {
            cumulative_growth *= g;
            let period_return = g - 1.0;
            SortinoPeriod {
                period_return,
                downside_return: shortfall(period_return, mar),
                cumulative_growth,
            }
        })
        .collect()
}

fn downside_returns(returns: &[f64], mar_per_period: f64) -> Vec<f64> {
    returns.iter().map(|r| shortfall(*r, mar_per_period)).collect()
}

fn shortfall(period_return: f64, mar_per_period: f64) -> f64 {
    (period_return - mar_per_period).min(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Frequency;

    fn monthly(mar: f64) -> AnalysisParams {
        AnalysisParams::new(Frequency::Monthly, mar)
    }

    #[test]
    fn worked_example() {
        let stats = sortino(&[1.1, 0.9, 1.1], &monthly(0.0));

        // Shortfalls are [0, -0.1, 0]; every period counts toward N.
        let mean: f64 = -0.1 / 3.0;
        let expected_dd = (((0.0 - mean) * (0.0 - mean) * 2.0 + (-0.1 - mean) * (-0.1 - mean)) / 3.0).sqrt();
        assert!((stats.downside_deviation_period.unwrap() - expected_dd).abs() < 1e-12);

        let expected_annual_dd = expected_dd * 12f64.sqrt();
        assert!((stats.downside_deviation_annualized.unwrap() - expected_annual_dd).abs() < 1e-12);

        let expected_return = 1.089f64.powf(4.0) - 1.0;
        assert!((stats.cumulative_return_annualized.unwrap() - expected_return).abs() < 1e-9);

        let ratio = stats.ratio.unwrap();
        assert!((ratio - expected_return / expected_annual_dd).abs() < 1e-9);
        assert!(ratio.is_finite());
    }

    #[test]
    fn never_below_target_is_an_explicit_error() {
        let stats = sortino(&[1.01, 1.02, 1.015, 1.03], &monthly(0.0));
        assert_eq!(stats.downside_deviation_annualized, Ok(0.0));
        assert_eq!(stats.ratio, Err(MetricError::ZeroDownsideDeviation));
        assert!(stats.std_dev_annualized.is_ok());
    }

    #[test]
    fn mar_raises_the_bar() {
        // 0.5% a month beats a zero target but not a 12% annual target.
        let growth = [1.005, 1.006, 1.004];
        assert_eq!(sortino(&growth, &monthly(0.0)).ratio, Err(MetricError::ZeroDownsideDeviation));
        assert!(sortino(&growth, &monthly(0.12)).ratio.is_ok());
    }

    #[test]
    fn annual_target_in_numerator_and_per_period_target_for_shortfalls() {
        let growth = [1.005, 0.99, 1.02];
        let stats = sortino(&growth, &monthly(0.06));

        // 0.5% beats the monthly target of ~0.487% but not the annual 6%.
        let mar_per_period = 1.06f64.powf(1.0 / 12.0) - 1.0;
        let shortfall = -0.01 - mar_per_period;
        // Shortfalls are [0, s, 0]; their population std-dev is |s| * sqrt(2) / 3.
        let expected_dd = shortfall.abs() * 2f64.sqrt() / 3.0;
        assert!((stats.downside_deviation_period.unwrap() - expected_dd).abs() < 1e-12);

        let expected_return = (1.005f64 * 0.99 * 1.02).powf(12.0 / 3.0) - 1.0;
        let expected_ratio = (expected_return - 0.06) / (expected_dd * 12f64.sqrt());
        assert!((stats.ratio.unwrap() - expected_ratio).abs() < 1e-9);

        let detail = sortino_detail(&growth, &monthly(0.06));
        assert_eq!(detail[0].downside_return, 0.0);
        assert!((detail[1].downside_return - shortfall).abs() < 1e-15);
        assert_eq!(detail[2].downside_return, 0.0);
    }

    #[test]
    fn std_dev_is_annualized_by_root_of_periods() {
        let growth = [1.1, 0.9];
        let stats = sortino(&growth, &AnalysisParams::new(Frequency::Weekly, 0.0));
        // Returns [0.1, -0.1] have a population std-dev of 0.1.
        assert!((stats.std_dev_annualized.unwrap() - 0.1 * 52f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn detail_accumulates_growth() {
        let detail = sortino_detail(&[1.1, 0.9, 1.1], &monthly(0.0));
        assert_eq!(detail.len(), 3);
        assert_eq!(detail[0].downside_return, 0.0);
        assert!((detail[1].downside_return + 0.1).abs() < 1e-12);
        assert!((detail[2].cumulative_growth - 1.089).abs() < 1e-12);
    }
}
