use crate::matrix::ReturnMatrix;
use serde::Serialize;
use std::fmt;

/// The direction of the market over one period, as judged by the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketDirection {
    Up,
    Down,
}

impl fmt::Display for MarketDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketDirection::Up => f.write_str("up"),
            MarketDirection::Down => f.write_str("down"),
        }
    }
}

/// The label of a single period.
///
/// A benchmark growth ratio of exactly 1 is `Neither` and counts toward neither
/// the up nor the down totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketPeriod {
    Up,
    Down,
    Neither,
}

impl MarketPeriod {
    pub fn from_growth_ratio(ratio: f64) -> Self {
        if ratio > 1.0 {
            MarketPeriod::Up
        } else if ratio < 1.0 {
            MarketPeriod::Down
        } else {
            MarketPeriod::Neither
        }
    }

    pub fn direction(&self) -> Option<MarketDirection> {
        match self {
            MarketPeriod::Up => Some(MarketDirection::Up),
            MarketPeriod::Down => Some(MarketDirection::Down),
            MarketPeriod::Neither => None,
        }
    }
}

impl fmt::Display for MarketPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction() {
            Some(direction) => fmt::Display::fmt(&direction, f),
            None => f.write_str("neither"),
        }
    }
}

/// One label per row of a [`ReturnMatrix`], derived from the benchmark column only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodClassification {
    periods: Vec<MarketPeriod>,
    up_periods: usize,
    down_periods: usize,
}

impl PeriodClassification {
    pub fn classify(returns: &ReturnMatrix) -> Self {
        Self::from_benchmark(&returns.benchmark_column())
    }

    pub fn from_benchmark(benchmark: &[f64]) -> Self {
        let periods: Vec<MarketPeriod> = benchmark
            .iter()
            .map(|ratio| MarketPeriod::from_growth_ratio(*ratio))
            .collect();
        let up_periods = periods.iter().filter(|p| **p == MarketPeriod::Up).count();
        let down_periods = periods.iter().filter(|p| **p == MarketPeriod::Down).count();

        Self {
            periods,
            up_periods,
            down_periods,
        }
    }

    pub fn periods(&self) -> &[MarketPeriod] {
        &self.periods
    }

    pub fn up_periods(&self) -> usize {
        self.up_periods
    }

    pub fn down_periods(&self) -> usize {
        self.down_periods
    }

    pub fn neither_periods(&self) -> usize {
        self.periods.len() - self.up_periods - self.down_periods
    }

    pub fn count(&self, direction: MarketDirection) -> usize {
        match direction {
            MarketDirection::Up => self.up_periods,
            MarketDirection::Down => self.down_periods,
        }
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1.05, MarketPeriod::Up)]
    #[test_case(0.97, MarketPeriod::Down)]
    #[test_case(1.0, MarketPeriod::Neither)]
    fn labels_follow_the_benchmark_ratio(ratio: f64, expected: MarketPeriod) {
        assert_eq!(MarketPeriod::from_growth_ratio(ratio), expected);
    }

    #[test]
    fn alternating_benchmark_has_no_neither_periods() {
        let classification = PeriodClassification::from_benchmark(&[1.02, 0.99, 1.01, 0.98, 1.03]);
        assert_eq!(classification.up_periods(), 3);
        assert_eq!(classification.down_periods(), 2);
        assert_eq!(
            classification.up_periods() + classification.down_periods(),
            classification.len()
        );
        assert_eq!(classification.neither_periods(), 0);
    }

    #[test]
    fn flat_periods_are_excluded_from_both_counts() {
        let classification = PeriodClassification::from_benchmark(&[1.1, 1.0, 0.9, 1.0]);
        assert_eq!(
            classification.periods(),
            &[
                MarketPeriod::Up,
                MarketPeriod::Neither,
                MarketPeriod::Down,
                MarketPeriod::Neither
            ]
        );
        assert_eq!(classification.count(MarketDirection::Up), 1);
        assert_eq!(classification.count(MarketDirection::Down), 1);
        assert_eq!(classification.neither_periods(), 2);
    }
}
