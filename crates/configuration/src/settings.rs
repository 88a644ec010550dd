use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::{Frequency, Instrument};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub analysis: AnalysisSettings,
    pub universe: Universe,
    #[serde(default)]
    pub tiingo: TiingoSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Contains the parameters of a single statistics run.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    /// A short label that becomes part of every exported file name.
    #[serde(default = "default_description")]
    pub description: String,
    /// The sampling frequency requested from the data source.
    pub frequency: Frequency,
    /// The first requested date. One extra observation before the window of
    /// interest is needed, because the first price is consumed by the growth ratio.
    pub start_date: NaiveDate,
    /// The last requested date.
    pub end_date: NaiveDate,
    /// Annualized minimum acceptable return, as a decimal (0.005 is 0.5%).
    #[serde(default)]
    pub min_acceptable_return: f64,
}

/// The instruments to analyze. The benchmark is the market proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct Universe {
    pub benchmark: String,
    #[serde(default)]
    pub instruments: Vec<String>,
}

/// Credentials and endpoint for the Tiingo end-of-day API.
#[derive(Debug, Clone, Deserialize)]
pub struct TiingoSettings {
    pub api_key: Option<String>,
    #[serde(default = "default_tiingo_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    /// Directory receiving the exported CSV and JSON files.
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    /// Also print the aligned price and growth ratio tables to the terminal.
    #[serde(default)]
    pub show_prices: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, a daily-rolling log file is written to this directory as well.
    pub directory: Option<PathBuf>,
}

/// The immutable parameters handed to the statistics engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisParams {
    pub frequency: Frequency,
    /// Annualized minimum acceptable return, as a decimal.
    pub min_acceptable_return: f64,
}

impl AnalysisParams {
    pub fn new(frequency: Frequency, min_acceptable_return: f64) -> Self {
        Self {
            frequency,
            min_acceptable_return,
        }
    }

    pub fn periods_per_year(&self) -> f64 {
        f64::from(self.frequency.periods_per_year())
    }

    /// The annual minimum acceptable return compounded down to a single period:
    /// `(1 + annual)^(1 / periods_per_year) - 1`.
    pub fn min_acceptable_return_per_period(&self) -> f64 {
        (1.0 + self.min_acceptable_return).powf(1.0 / self.periods_per_year()) - 1.0
    }
}

impl Settings {
    /// Checks the cross-field rules that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let analysis = &self.analysis;
        if analysis.end_date <= analysis.start_date {
            return Err(ConfigError::ValidationError(format!(
                "end_date ({}) must be after start_date ({})",
                analysis.end_date, analysis.start_date
            )));
        }
        if !analysis.min_acceptable_return.is_finite() || analysis.min_acceptable_return <= -1.0 {
            return Err(ConfigError::ValidationError(
                "min_acceptable_return must be a finite decimal greater than -1".to_string(),
            ));
        }
        if analysis.description.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "description cannot be empty".to_string(),
            ));
        }
        self.universe.instruments()?;
        Ok(())
    }

    /// The engine parameters derived from the `[analysis]` section.
    pub fn analysis_params(&self) -> AnalysisParams {
        AnalysisParams::new(
            self.analysis.frequency,
            self.analysis.min_acceptable_return,
        )
    }

    /// The Tiingo API key, required only when prices are fetched remotely.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.tiingo
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ConfigError::ValidationError(
                    "a Tiingo API key is required; set tiingo.api_key or MARKET_STATS__TIINGO__API_KEY"
                        .to_string(),
                )
            })
    }
}

impl Universe {
    /// The normalized instrument list with the benchmark first.
    ///
    /// Every ticker must appear exactly once after normalization.
    pub fn instruments(&self) -> Result<Vec<Instrument>, ConfigError> {
        let mut all = Vec::with_capacity(self.instruments.len() + 1);
        all.push(Instrument::normalized(&self.benchmark)?);
        for raw in &self.instruments {
            all.push(Instrument::normalized(raw)?);
        }

        let mut seen = HashSet::new();
        for instrument in &all {
            if !seen.insert(instrument) {
                return Err(ConfigError::ValidationError(format!(
                    "instrument '{instrument}' is listed more than once"
                )));
            }
        }
        Ok(all)
    }
}

impl Default for TiingoSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_tiingo_url(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            show_prices: false,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_description() -> String {
    "analysis".to_string()
}

fn default_tiingo_url() -> String {
    "https://api.tiingo.com".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_log_level() -> String {
    "info".to_string()
}
