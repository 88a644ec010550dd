use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod overrides;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_tracing;
pub use overrides::Overrides;
pub use settings::{
    AnalysisParams, AnalysisSettings, LoggingSettings, OutputSettings, Settings, TiingoSettings,
    Universe,
};

/// Prefix of the environment variables that override file values,
/// e.g. `MARKET_STATS__TIINGO__API_KEY`.
pub const ENV_PREFIX: &str = "MARKET_STATS";

/// Loads the application configuration from a TOML file.
///
/// Environment variables prefixed with `MARKET_STATS__` are layered on top of the
/// file, so secrets such as the API key never need to be written to disk. The
/// deserialized settings are validated before being returned.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(settings)
}
