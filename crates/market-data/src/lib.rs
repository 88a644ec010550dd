//! # Market Data
//!
//! Sources of raw price histories for the statistics engine: the Tiingo
//! end-of-day API and a local directory of CSV files in the same layout.

use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{Frequency, Instrument, PriceSeries};
use futures::future::join_all;

pub mod csv_source;
pub mod error;
pub mod parse;
pub mod responses;
pub mod tiingo;

// --- Public API ---
pub use csv_source::{save_series, CsvDirectorySource};
pub use error::ApiError;
pub use responses::Metadata;
pub use tiingo::TiingoClient;

/// The abstract interface for a provider of adjusted closing prices.
/// The CLI depends only on this trait, so the HTTP client and the offline
/// CSV source (or a mock) can be swapped freely.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetches the listing metadata, including the available date range.
    async fn fetch_metadata(&self, instrument: &Instrument) -> Result<Metadata, ApiError>;

    /// Fetches adjusted closing prices between `start` and `end`, inclusive,
    /// sampled at `frequency`.
    async fn fetch_prices(
        &self,
        instrument: &Instrument,
        start: NaiveDate,
        end: NaiveDate,
        frequency: Frequency,
    ) -> Result<PriceSeries, ApiError>;

    /// Whether the listed date range should be held against the requested
    /// one. Sources whose metadata is derived from sampled prices return
    /// `false`: their first and last dates are period ends, not listing dates.
    fn checks_listed_coverage(&self) -> bool {
        true
    }
}

/// Checks that every instrument exists and covers `start..=end` before any
/// prices are requested.
///
/// All instruments are checked; when any fail, every failure is returned
/// together in an `ApiError::Validation`. Sources that opt out of
/// `checks_listed_coverage` are only checked for existence.
pub async fn validate_coverage<S>(
    source: &S,
    instruments: &[Instrument],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Metadata>, ApiError>
where
    S: PriceSource + ?Sized,
{
    let check_range = source.checks_listed_coverage();
    let checks = instruments.iter().map(|instrument| async move {
        let metadata = source.fetch_metadata(instrument).await?;
        if check_range {
            metadata.ensure_coverage(instrument, start, end)?;
        }
        tracing::info!(%instrument, "metadata is OK");
        Ok::<_, ApiError>(metadata)
    });

    let mut accepted = Vec::with_capacity(instruments.len());
    let mut failures = Vec::new();
    for result in join_all(checks).await {
        match result {
            Ok(metadata) => accepted.push(metadata),
            Err(error) => {
                tracing::error!(%error, "instrument failed validation");
                failures.push(error);
            }
        }
    }

    if failures.is_empty() {
        Ok(accepted)
    } else {
        Err(ApiError::Validation(failures))
    }
}
