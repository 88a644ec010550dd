use crate::settings::Settings;
use chrono::NaiveDate;
use core_types::Frequency;

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct Overrides {
    /// Sampling frequency: daily, weekly, monthly or annually.
    #[cfg_attr(feature = "clap", arg(long))]
    pub frequency: Option<Frequency>,

    /// Annualized minimum acceptable return as a decimal (e.g. 0.005 for 0.5%).
    #[cfg_attr(feature = "clap", arg(long = "mar", allow_hyphen_values = true))]
    pub min_acceptable_return: Option<f64>,

    /// The start date of the requested window (format: YYYY-MM-DD).
    #[cfg_attr(feature = "clap", arg(long))]
    pub from: Option<NaiveDate>,

    /// The end date of the requested window (format: YYYY-MM-DD).
    #[cfg_attr(feature = "clap", arg(long))]
    pub to: Option<NaiveDate>,
}

impl Overrides {
    /// Writes every provided value into `settings`. Validation is left to the caller.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(frequency) = self.frequency {
            settings.analysis.frequency = frequency;
        }
        if let Some(mar) = self.min_acceptable_return {
            settings.analysis.min_acceptable_return = mar;
        }
        if let Some(from) = self.from {
            settings.analysis.start_date = from;
        }
        if let Some(to) = self.to {
            settings.analysis.end_date = to;
        }
    }
}
