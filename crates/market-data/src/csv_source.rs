use crate::error::ApiError;
use crate::parse::{parse_price_csv, write_price_csv};
use crate::responses::Metadata;
use crate::PriceSource;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{Frequency, Instrument, PriceSeries};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads price histories from `{directory}/{TICKER}.csv`, for offline runs.
///
/// Files are expected to be sampled at the requested frequency already, as
/// written by the `fetch` command. Their first date is therefore a period
/// end, so the listed range is not held against the requested one.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    directory: PathBuf,
}

impl CsvDirectorySource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, instrument: &Instrument) -> PathBuf {
        series_path(&self.directory, instrument)
    }

    async fn load(&self, instrument: &Instrument) -> Result<PriceSeries, ApiError> {
        let path = self.path_for(instrument);
        let bytes = tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ApiError::TickerNotFound(instrument.clone())
            } else {
                ApiError::Io { path: path.clone(), source }
            }
        })?;
        parse_price_csv(instrument, bytes.as_slice())
    }
}

#[async_trait]
impl PriceSource for CsvDirectorySource {
    async fn fetch_metadata(&self, instrument: &Instrument) -> Result<Metadata, ApiError> {
        let series = self.load(instrument).await?;
        let range = series.date_range();
        Ok(Metadata {
            ticker: Some(instrument.to_string()),
            name: None,
            exchange_code: None,
            start_date: range.map(|(first, _)| first),
            end_date: range.map(|(_, last)| last),
        })
    }

    fn checks_listed_coverage(&self) -> bool {
        false
    }

    async fn fetch_prices(
        &self,
        instrument: &Instrument,
        start: NaiveDate,
        end: NaiveDate,
        frequency: Frequency,
    ) -> Result<PriceSeries, ApiError> {
        if end < start {
            return Err(ApiError::EmptyRange { start, end });
        }
        let mut series = self.load(instrument).await?;
        let total = series.len();
        series.points.retain(|p| (start..=end).contains(&p.date));
        tracing::debug!(
            %instrument,
            %frequency,
            kept = series.len(),
            total,
            "prices loaded from {}",
            self.directory.display()
        );
        Ok(series)
    }
}

/// Writes `series` to `{directory}/{TICKER}.csv`, creating the directory if needed.
pub fn save_series(directory: &Path, series: &PriceSeries) -> Result<PathBuf, ApiError> {
    fs::create_dir_all(directory).map_err(|source| ApiError::Io {
        path: directory.to_path_buf(),
        source,
    })?;
    let path = series_path(directory, &series.instrument);
    let file = File::create(&path).map_err(|source| ApiError::Io {
        path: path.clone(),
        source,
    })?;
    write_price_csv(series, file)?;
    Ok(path)
}

fn series_path(directory: &Path, instrument: &Instrument) -> PathBuf {
    directory.join(format!("{instrument}.csv"))
}
