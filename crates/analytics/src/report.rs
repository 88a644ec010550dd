use crate::capture::{capture_ratio, CaptureStats};
use crate::error::MetricError;
use crate::sortino::SortinoStats;
use core_types::Instrument;
use serde::Serialize;
use std::fmt;

/// A single statistics cell: either a finite number or the reason it is missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metric {
    Value(f64),
    Unavailable { error: MetricError },
}

impl Metric {
    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::Unavailable { .. } => None,
        }
    }

    pub fn error(&self) -> Option<MetricError> {
        match self {
            Metric::Value(_) => None,
            Metric::Unavailable { error } => Some(*error),
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Metric::Value(_))
    }
}

impl From<Result<f64, MetricError>> for Metric {
    fn from(result: Result<f64, MetricError>) -> Self {
        match result {
            Ok(v) if v.is_finite() => Metric::Value(v),
            Ok(_) => Metric::Unavailable { error: MetricError::NonFinite },
            Err(error) => Metric::Unavailable { error },
        }
    }
}

impl From<f64> for Metric {
    fn from(value: f64) -> Self {
        Metric::from(Ok(value))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{v:.4}"),
            Metric::Unavailable { error } => write!(f, "n/a: {error}"),
        }
    }
}

/// A cell of the statistics table, for generic rendering by the export layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatisticValue {
    Count(usize),
    Metric(Metric),
}

impl fmt::Display for StatisticValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatisticValue::Count(n) => write!(f, "{n}"),
            StatisticValue::Metric(m) => fmt::Display::fmt(m, f),
        }
    }
}

/// The complete set of comparative statistics for one instrument.
///
/// Produced exactly once per instrument per run and never modified afterwards.
/// Every numeric field is a [`Metric`], so a failed calculation shows up as an
/// explicit error in the cell it affects and nowhere else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsRecord {
    pub instrument: Instrument,
    pub beta: Metric,
    pub std_dev: Metric,
    pub up_periods: usize,
    pub down_periods: usize,
    pub cum_up: Metric,
    pub cum_down: Metric,
    pub cum_up_annualized: Metric,
    pub cum_down_annualized: Metric,
    pub cum_up_pct: Metric,
    pub cum_down_pct: Metric,
    pub cum_up_annualized_pct: Metric,
    pub cum_down_annualized_pct: Metric,
    pub upside_capture_pct: Metric,
    pub downside_capture_pct: Metric,
    pub sortino: Metric,
}

impl StatisticsRecord {
    /// Column headings, in the order returned by [`StatisticsRecord::values`].
    pub const LABELS: [&'static str; 15] = [
        "beta",
        "std dev",
        "mkt up periods",
        "mkt dn periods",
        "cum chg up mkt",
        "cum chg dn mkt",
        "cum chg up mkt annlzd",
        "cum chg dn mkt annlzd",
        "cum chg up mkt %",
        "cum chg dn mkt %",
        "cum chg up mkt annlzd %",
        "cum chg dn mkt annlzd %",
        "upside capture %",
        "dwnside capture %",
        "sortino",
    ];

    /// Assembles the record from the independently computed pieces.
    pub fn assemble(
        instrument: Instrument,
        beta: Result<f64, MetricError>,
        capture: &CaptureStats,
        benchmark_capture: &CaptureStats,
        sortino: &SortinoStats,
    ) -> Self {
        Self {
            instrument,
            beta: beta.into(),
            std_dev: sortino.std_dev_annualized.into(),
            up_periods: capture.up.periods,
            down_periods: capture.down.periods,
            cum_up: capture.up.cumulative.into(),
            cum_down: capture.down.cumulative.into(),
            cum_up_annualized: capture.up.annualized.into(),
            cum_down_annualized: capture.down.annualized.into(),
            cum_up_pct: capture.up.cumulative_pct().into(),
            cum_down_pct: capture.down.cumulative_pct().into(),
            cum_up_annualized_pct: capture.up.annualized_pct().into(),
            cum_down_annualized_pct: capture.down.annualized_pct().into(),
            upside_capture_pct: capture_ratio(&capture.up, &benchmark_capture.up).into(),
            downside_capture_pct: capture_ratio(&capture.down, &benchmark_capture.down).into(),
            sortino: sortino.ratio.into(),
        }
    }

    /// The cells of this record, aligned with [`StatisticsRecord::LABELS`].
    pub fn values(&self) -> [StatisticValue; 15] {
        use StatisticValue::{Count, Metric as M};
        [
            M(self.beta),
            M(self.std_dev),
            Count(self.up_periods),
            Count(self.down_periods),
            M(self.cum_up),
            M(self.cum_down),
            M(self.cum_up_annualized),
            M(self.cum_down_annualized),
            M(self.cum_up_pct),
            M(self.cum_down_pct),
            M(self.cum_up_annualized_pct),
            M(self.cum_down_annualized_pct),
            M(self.upside_capture_pct),
            M(self.downside_capture_pct),
            M(self.sortino),
        ]
    }

    /// Every metric that could not be computed, with its column label.
    pub fn errors(&self) -> Vec<(&'static str, MetricError)> {
        Self::LABELS
            .iter()
            .zip(self.values())
            .filter_map(|(label, value)| match value {
                StatisticValue::Metric(m) => m.error().map(|e| (*label, e)),
                StatisticValue::Count(_) => None,
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.errors().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::MarketDirection;

    #[test]
    fn non_finite_values_become_errors() {
        assert_eq!(
            Metric::from(f64::INFINITY),
            Metric::Unavailable { error: MetricError::NonFinite }
        );
        assert_eq!(
            Metric::from(Ok::<f64, MetricError>(f64::NAN)).error(),
            Some(MetricError::NonFinite)
        );
        assert_eq!(Metric::from(1.5).value(), Some(1.5));
    }

    #[test]
    fn display_marks_missing_cells() {
        let missing = Metric::from(Err(MetricError::ZeroPeriod(MarketDirection::Down)));
        assert_eq!(missing.to_string(), "n/a: no down market periods");
        assert_eq!(Metric::Value(1.23456).to_string(), "1.2346");
    }

    #[test]
    fn serializes_values_as_numbers_and_errors_as_objects() {
        assert_eq!(serde_json::to_string(&Metric::Value(2.5)).unwrap(), "2.5");
        assert_eq!(
            serde_json::to_string(&Metric::Unavailable { error: MetricError::ZeroVariance }).unwrap(),
            r#"{"error":"zero_variance"}"#
        );
        assert_eq!(
            serde_json::to_string(&Metric::from(Err(MetricError::ZeroPeriod(MarketDirection::Up))))
                .unwrap(),
            r#"{"error":{"zero_period":"up"}}"#
        );
    }
}
