use crate::error::ApiError;
use crate::parse::parse_price_csv;
use crate::responses::{ErrorResponse, Metadata};
use crate::PriceSource;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{Frequency, Instrument, PriceSeries};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;

/// A concrete implementation of the `PriceSource` for the Tiingo end-of-day API.
#[derive(Clone)]
pub struct TiingoClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl TiingoClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            client: reqwest::Client::builder().default_headers(headers).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn daily_url(&self, instrument: &Instrument) -> String {
        format!("{}/tiingo/daily/{}", self.base_url, instrument)
    }

    /// Sends an authenticated GET and returns the body of a successful response.
    async fn get_text(
        &self,
        instrument: &Instrument,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<String, ApiError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("token", &self.token)])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        // Tiingo reports some failures with a 200 and a `{"detail": ...}` body.
        let error = ErrorResponse::parse(&text);
        if status == StatusCode::NOT_FOUND || error.as_ref().is_some_and(ErrorResponse::is_not_found) {
            return Err(ApiError::TickerNotFound(instrument.clone()));
        }
        if let Some(error) = error {
            return Err(ApiError::ApiError(format!("{status}: {}", error.detail)));
        }
        if !status.is_success() {
            return Err(ApiError::ApiError(format!("{status}: {text}")));
        }
        Ok(text)
    }
}

#[async_trait]
impl PriceSource for TiingoClient {
    async fn fetch_metadata(&self, instrument: &Instrument) -> Result<Metadata, ApiError> {
        let url = self.daily_url(instrument);
        let text = self.get_text(instrument, &url, &[]).await?;
        let metadata: Metadata =
            serde_json::from_str(&text).map_err(|e| ApiError::Deserialization(e.to_string()))?;
        tracing::debug!(
            %instrument,
            name = metadata.name.as_deref().unwrap_or_default(),
            start = ?metadata.start_date,
            end = ?metadata.end_date,
            "metadata received"
        );
        Ok(metadata)
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
        let url = format!("{}/prices", self.daily_url(instrument));
        let params = [
            ("startDate", start.to_string()),
            ("endDate", end.to_string()),
            ("resampleFreq", frequency.as_provider_str().to_string()),
            ("format", "csv".to_string()),
        ];
        let text = self.get_text(instrument, &url, &params).await?;
        let series = parse_price_csv(instrument, text.as_bytes())?;
        tracing::info!(%instrument, points = series.len(), "prices downloaded");
        Ok(series)
    }
}
