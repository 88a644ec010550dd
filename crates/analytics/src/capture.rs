use crate::classifier::{MarketDirection, PeriodClassification};
use crate::error::{finite, MetricError};
use crate::math::product;
use serde::Serialize;

/// An instrument's compounded growth over the periods of one market direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DirectionalGrowth {
    pub direction: MarketDirection,
    /// Number of periods the benchmark moved in `direction`.
    pub periods: usize,
    /// Product of the instrument's growth ratios over those periods.
    pub cumulative: f64,
    /// `cumulative ^ (periods_per_year / periods)`.
    pub annualized: Result<f64, MetricError>,
}

impl DirectionalGrowth {
    pub fn cumulative_pct(&self) -> f64 {
        (self.cumulative - 1.0) * 100.0
    }

    pub fn annualized_pct(&self) -> Result<f64, MetricError> {
        self.annualized.and_then(|a| finite((a - 1.0) * 100.0))
    }
}

/// Up- and down-market growth of one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CaptureStats {
    pub up: DirectionalGrowth,
    pub down: DirectionalGrowth,
}

impl CaptureStats {
    pub fn compute(
        growth: &[f64],
        classification: &PeriodClassification,
        periods_per_year: f64,
    ) -> Self {
        Self {
            up: directional_growth(growth, classification, MarketDirection::Up, periods_per_year),
            down: directional_growth(growth, classification, MarketDirection::Down, periods_per_year),
        }
    }

    pub fn get(&self, direction: MarketDirection) -> &DirectionalGrowth {
        match direction {
            MarketDirection::Up => &self.up,
            MarketDirection::Down => &self.down,
        }
    }
}

/// Compounds the growth ratios of the periods labelled `direction` and annualizes
/// the result geometrically, as if those periods recurred at their observed rate.
pub fn directional_growth(
    growth: &[f64],
    classification: &PeriodClassification,
    direction: MarketDirection,
    periods_per_year: f64,
) -> DirectionalGrowth {
    let selected = growth
        .iter()
        .zip(classification.periods())
        .filter(|(_, period)| period.direction() == Some(direction))
        .map(|(ratio, _)| *ratio);
    let cumulative = product(selected);
    let periods = classification.count(direction);

    let annualized = if periods == 0 {
        Err(MetricError::ZeroPeriod(direction))
    } else {
        finite(cumulative.powf(periods_per_year / periods as f64))
    };

    DirectionalGrowth {
        direction,
        periods,
        cumulative,
        annualized,
    }
}

/// The instrument's annualized directional return as a percentage of the
/// benchmark's: `100 * instrument% / benchmark%`.
pub fn capture_ratio(
    instrument: &DirectionalGrowth,
    benchmark: &DirectionalGrowth,
) -> Result<f64, MetricError> {
    let instrument_pct = instrument.annualized_pct()?;
    let benchmark_pct = benchmark.annualized_pct()?;
    if benchmark_pct == 0.0 {
        return Err(MetricError::ZeroBenchmarkReturn(benchmark.direction));
    }
    finite(100.0 * instrument_pct / benchmark_pct)
}
