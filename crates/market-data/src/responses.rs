use crate::error::ApiError;
use chrono::NaiveDate;
use core_types::Instrument;
use serde::{Deserialize, Serialize};

// Tiingo uses camelCase field names; `rename_all` maps them onto snake_case.

/// The response of `GET /tiingo/daily/{ticker}`.
///
/// The listed dates are `null` for tickers that have no price history.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exchange_code: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Metadata {
    /// Checks that the listed history covers `start..=end`.
    pub fn ensure_coverage(
        &self,
        instrument: &Instrument,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), ApiError> {
        let insufficient = |reason: String| ApiError::InsufficientHistory {
            instrument: instrument.clone(),
            reason,
        };
        let (Some(first), Some(last)) = (self.start_date, self.end_date) else {
            return Err(insufficient(
                "earliest and/or latest dates missing from metadata".to_string(),
            ));
        };
        if first > start {
            return Err(insufficient(format!("history starts on {first}, after {start}")));
        }
        if last < end {
            return Err(insufficient(format!("history ends on {last}, before {end}")));
        }
        Ok(())
    }
}

/// Represents an error response from the Tiingo API, e.g. `{"detail":"Not found."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub const NOT_FOUND: &'static str = "Not found.";

    /// Parses `body` as an error response, if it is one.
    pub fn parse(body: &str) -> Option<Self> {
        let trimmed = body.trim_start();
        if !trimmed.starts_with('{') {
            return None;
        }
        serde_json::from_str(trimmed).ok()
    }

    pub fn is_not_found(&self) -> bool {
        self.detail == Self::NOT_FOUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn spy() -> Instrument {
        Instrument::normalized("SPY").unwrap()
    }

    #[test]
    fn deserializes_listed_and_unlisted_metadata() {
        let listed: Metadata = serde_json::from_str(
            r#"{"ticker":"SPY","name":"SPDR S&P 500 ETF","exchangeCode":"NYSE ARCA",
                "startDate":"1993-01-29","endDate":"2024-05-31","description":"..."}"#,
        )
        .unwrap();
        assert_eq!(listed.start_date, Some(date("1993-01-29")));
        assert_eq!(listed.name.as_deref(), Some("SPDR S&P 500 ETF"));

        let unlisted: Metadata =
            serde_json::from_str(r#"{"ticker":"XYZ","startDate":null,"endDate":null}"#).unwrap();
        assert_eq!(unlisted.start_date, None);
    }

    #[test]
    fn coverage_requires_both_ends() {
        let metadata = Metadata {
            ticker: None,
            name: None,
            exchange_code: None,
            start_date: Some(date("2010-01-04")),
            end_date: Some(date("2020-12-31")),
        };
        assert!(metadata.ensure_coverage(&spy(), date("2012-01-01"), date("2020-12-31")).is_ok());
        assert!(matches!(
            metadata.ensure_coverage(&spy(), date("2009-12-01"), date("2015-01-01")),
            Err(ApiError::InsufficientHistory { .. })
        ));
        assert!(matches!(
            metadata.ensure_coverage(&spy(), date("2012-01-01"), date("2021-01-31")),
            Err(ApiError::InsufficientHistory { .. })
        ));

        let blank = Metadata { start_date: None, ..metadata };
        assert!(blank.ensure_coverage(&spy(), date("2012-01-01"), date("2013-01-01")).is_err());
    }

    #[test]
    fn recognizes_error_bodies() {
        assert!(ErrorResponse::parse(r#"{"detail":"Not found."}"#).unwrap().is_not_found());
        assert!(!ErrorResponse::parse(r#"{"detail":"Invalid token."}"#).unwrap().is_not_found());
        assert!(ErrorResponse::parse("date,adjClose\n2020-01-31,1.0").is_none());
    }
}
