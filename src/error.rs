//! Error types for the treehash digest engine.

use std::time::Duration;
use thiserror::Error;

/// Run-fatal scan errors.
///
/// Per-item failures (an unreadable file, an unlistable directory) are not
/// errors at this level; they are collected into the scan report so one bad
/// entry never aborts the run.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid scan path: {0}")]
    InvalidPath(String),

    #[error("time budget of {budget:?} elapsed before the walk completed")]
    DeadlineExceeded { budget: Duration },
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration value: {0}")]
    Invalid(String),
}
