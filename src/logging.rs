//! Logging System
//!
//! Structured logging using the `tracing` crate. Log lines go to stderr so
//! the digest printed on stdout stays machine-readable.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Enable colored output (text format only)
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            color: default_true(),
        }
    }
}

/// Initialize the logging system.
///
/// The `TREEHASH_LOG` environment variable takes precedence over the
/// configured level and accepts full `tracing` filter directives.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = build_env_filter(config);
    let base_subscriber = Registry::default().with(filter);

    match config.format.as_str() {
        "json" => {
            base_subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        "text" => {
            base_subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_ansi(config.color)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        other => {
            return Err(ConfigError::Invalid(format!(
                "invalid log format: {} (must be 'json' or 'text')",
                other
            )));
        }
    }

    Ok(())
}

/// Build the filter from the environment or the configured level.
fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env("TREEHASH_LOG") {
        return filter;
    }
    EnvFilter::new(config.level.as_str())
}
