//! CLI definitions: argument parsing, option merging, and report rendering.
//! Exit codes and process wiring live in the binary.

use crate::config::{AgentConfig, ScanConfig};
use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use crate::scan::{ScanOptions, ScanReport};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Treehash CLI - deterministic content digests for directory trees
#[derive(Parser)]
#[command(name = "treehash")]
#[command(about = "Deterministic content digests for directory trees")]
pub struct Cli {
    /// Directory tree to digest
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Prefix stripped from reported paths (defaults to the scan root)
    #[arg(long)]
    pub strip_prefix: Option<PathBuf>,

    /// Overall time budget for one scan, in seconds
    #[arg(long)]
    pub time_budget: Option<u64>,

    /// Read buffer size for file hashing, in bytes
    #[arg(long)]
    pub buffer_size: Option<usize>,

    /// Cap on simultaneous filesystem operations
    #[arg(long)]
    pub max_io: Option<usize>,

    /// Keep running and recompute the digest on an interval
    #[arg(long)]
    pub agent: bool,

    /// Seconds between scheduled scans (agent mode)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Startup delay before the first scheduled scan, in seconds (agent mode)
    #[arg(long)]
    pub delay: Option<u64>,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// List every hashed file as "<digest>  <path>" before the root digest
    #[arg(long)]
    pub list: bool,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off outside agent mode)
    #[arg(long)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

impl Cli {
    /// Merge CLI flags over the configured scan parameters.
    pub fn scan_options(&self, base: &ScanConfig) -> ScanOptions {
        let mut config = base.clone();
        if let Some(path) = &self.path {
            config.path = path.clone();
        }
        if let Some(prefix) = &self.strip_prefix {
            config.strip_prefix = Some(prefix.clone());
        }
        if let Some(secs) = self.time_budget {
            config.time_budget_secs = secs;
        }
        if let Some(size) = self.buffer_size {
            config.buffer_size = size;
        }
        if let Some(max_io) = self.max_io {
            config.max_io = max_io;
        }
        config.to_options()
    }

    pub fn agent_interval(&self, base: &AgentConfig) -> Duration {
        self.interval
            .map(Duration::from_secs)
            .unwrap_or_else(|| base.interval())
    }

    pub fn agent_delay(&self, base: &AgentConfig) -> Duration {
        self.delay
            .map(Duration::from_secs)
            .unwrap_or_else(|| base.delay())
    }

    /// Merge CLI flags over the configured logging parameters.
    ///
    /// Without `--verbose`, one-shot runs log nothing so stdout/stderr stay
    /// clean; agent mode keeps logging on since digests are reported through
    /// the log stream.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if !self.verbose && !self.agent {
            config.level = "off".to_string();
        }
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        config
    }

    /// Render a report in the selected output format.
    pub fn render_report(&self, report: &ScanReport) -> Result<String, ConfigError> {
        match self.format.as_str() {
            "json" => serde_json::to_string_pretty(report)
                .map_err(|e| ConfigError::Invalid(format!("failed to encode report: {}", e))),
            "text" => {
                let mut output = String::new();
                if self.list {
                    for record in &report.files {
                        output.push_str(&hex::encode(record.digest));
                        output.push_str("  ");
                        output.push_str(&record.path);
                        output.push('\n');
                    }
                }
                output.push_str(&report.digest_hex());
                Ok(output)
            }
            other => Err(ConfigError::Invalid(format!(
                "invalid output format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }
}
