use chrono::NaiveDate;
use core_types::Instrument;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to send the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The API request returned an error: {0}")]
    ApiError(String),

    #[error("Ticker '{0}' not found")]
    TickerNotFound(Instrument),

    #[error("Price history of '{instrument}' is shorter than requested: {reason}")]
    InsufficientHistory { instrument: Instrument, reason: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid price data for '{instrument}' on line {line}: {reason}")]
    InvalidData {
        instrument: Instrument,
        line: u64,
        reason: String,
    },

    #[error("Failed to read or write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Requested range {start} to {end} is empty")]
    EmptyRange { start: NaiveDate, end: NaiveDate },

    #[error("{} instrument(s) failed validation: {}", .0.len(), join(.0))]
    Validation(Vec<ApiError>),
}

fn join(errors: &[ApiError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
