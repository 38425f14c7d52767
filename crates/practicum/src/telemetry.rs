use std::fmt;

use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

#[derive(Debug)]
pub enum TelemetryError {
    InvalidFilter { source: tracing_subscriber::filter::ParseError },
    InitFailed(String),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter { .. } => {
                write!(f, "APP_LOG_LEVEL is not a valid tracing filter")
            }
            TelemetryError::InitFailed(message) => {
                write!(f, "failed to install tracing subscriber: {message}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidFilter { source } => Some(source),
            TelemetryError::InitFailed(_) => None,
        }
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` takes precedence over
/// the configured level so operators can raise verbosity without editing the
/// environment file.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::builder()
            .parse(&config.log_level)
            .map_err(|source| TelemetryError::InvalidFilter { source })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .try_init()
        .map_err(|err| TelemetryError::InitFailed(err.to_string()))
}
