use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A ticker symbol identifying one instrument.
///
/// Tickers are stored in the provider's canonical form: uppercase, with `-` in
/// place of `.` for share classes (`BF.B` becomes `BF-B`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instrument(String);

impl Instrument {
    /// Normalizes a user-supplied ticker into its canonical form.
    pub fn normalized(raw: &str) -> Result<Self, CoreError> {
        let ticker = raw.trim().to_ascii_uppercase().replace('.', "-");
        if ticker.is_empty() {
            return Err(CoreError::InvalidInput(
                "ticker".to_string(),
                "ticker symbol cannot be empty".to_string(),
            ));
        }
        if ticker.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidInput(
                "ticker".to_string(),
                format!("'{ticker}' contains whitespace"),
            ));
        }
        Ok(Self(ticker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One adjusted closing price on a given trading date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adj_close: Decimal,
}

/// The raw price history of a single instrument, as delivered by a data source.
///
/// Series from different instruments need not share the same dates; gaps are
/// resolved later when the series are aligned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub instrument: Instrument,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(instrument: Instrument, points: Vec<PricePoint>) -> Self {
        Self { instrument, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The first and last observed dates, if the series has any points.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.points.iter().map(|p| p.date).min()?;
        let last = self.points.iter().map(|p| p.date).max()?;
        Some((first, last))
    }
}
