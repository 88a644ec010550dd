use crate::error::ConfigError;
use crate::settings::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "market-stats.log";

/// Installs the global tracing subscriber.
///
/// Console output goes to stderr so that tables printed on stdout stay clean.
/// When a log directory is configured, a second, non-ANSI layer writes to a
/// daily-rolling file; the returned guard must be held until shutdown so that
/// buffered lines are flushed.
pub fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| ConfigError::Logging(format!("invalid log level '{}': {e}", settings.level)))?;

    let console = fmt::layer()
        .with_timer(LocalTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr);

    match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = fmt::layer()
                .with_timer(LocalTime::rfc_3339())
                .with_ansi(false)
                .with_writer(writer);

            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(file)
                .try_init()
                .map_err(|e| ConfigError::Logging(e.to_string()))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .try_init()
                .map_err(|e| ConfigError::Logging(e.to_string()))?;
            Ok(None)
        }
    }
}
