use crate::classifier::MarketDirection;
use chrono::NaiveDate;
use core_types::Instrument;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Failures that make the whole run untrustworthy. No statistics are produced
/// when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("No price series were supplied")]
    NoInstruments,

    #[error("Instrument '{0}' was supplied more than once")]
    DuplicateInstrument(Instrument),

    #[error("Not enough data to perform calculation: {rows} aligned row(s), at least 2 are required")]
    InsufficientData { rows: usize },

    #[error("Invalid price {price} for '{instrument}' on {date}: prices must be positive")]
    InvalidPrice {
        instrument: Instrument,
        date: NaiveDate,
        price: Decimal,
    },
}

/// The reason a single statistic of a single instrument could not be computed.
///
/// These never abort a run; they take the place of the value in the output table.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricError {
    #[error("no {0} market periods")]
    ZeroPeriod(MarketDirection),

    #[error("benchmark variance is zero")]
    ZeroVariance,

    #[error("downside deviation is zero")]
    ZeroDownsideDeviation,

    #[error("benchmark {0} market return is zero")]
    ZeroBenchmarkReturn(MarketDirection),

    #[error("result is not a finite number")]
    NonFinite,
}

/// Rejects NaN and infinities so they never reach the output boundary.
pub(crate) fn finite(value: f64) -> Result<f64, MetricError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MetricError::NonFinite)
    }
}
