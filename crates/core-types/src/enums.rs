use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The sampling frequency of a price series.
///
/// The frequency determines how many periods make up one year, which is the
/// exponent base for every annualized statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Annually,
}

impl Frequency {
    /// Number of periods in one year. Daily uses an average count of trading days.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Daily => 253,
            Frequency::Weekly => 52,
            Frequency::Monthly => 12,
            Frequency::Annually => 1,
        }
    }

    /// The name the data provider uses for its `resampleFreq` parameter.
    pub fn as_provider_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Annually => "annually",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_provider_str())
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "annually" | "yearly" => Ok(Frequency::Annually),
            other => Err(CoreError::InvalidInput(
                "frequency".to_string(),
                format!(
                    "'{other}' is not one of 'daily', 'weekly', 'monthly' or 'annually'"
                ),
            )),
        }
    }
}
