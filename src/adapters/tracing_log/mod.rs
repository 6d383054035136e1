// Tracing log adapter - Structured logging using tracing crate

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::domain::errors::*;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Pretty,
    /// JSON format for structured logging
    Json,
}

impl FromStr for LogFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(DomainError::Config(format!(
                "Invalid log format '{}', expected pretty or json",
                other
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Build the filter: `RUST_LOG` wins, otherwise the configured level
pub fn env_filter(default_level: &str) -> Result<EnvFilter, DomainError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(default_level)
        .map_err(|e| DomainError::Config(format!("Invalid log level '{}': {}", default_level, e)))
}

/// Install the global subscriber. Logs go to stderr so command output
/// on stdout stays machine-readable. A second call is a no-op.
pub fn init(level: &str, format: LogFormat) -> Result<(), DomainError> {
    let filter = env_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}
