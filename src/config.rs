//! Configuration System
//!
//! Layered configuration: defaults, then an optional config file (explicit
//! path, `./treehash.toml`, or the XDG config directory), then `TREEHASH_*`
//! environment variables. CLI flags override everything and are merged by the
//! binary.

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use crate::scan::{ScanOptions, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_IO};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreehashConfig {
    /// Scan parameters
    #[serde(default)]
    pub scan: ScanConfig,

    /// Polling agent parameters
    #[serde(default)]
    pub agent: AgentConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Parameters of one tree scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory tree to digest
    #[serde(default = "default_scan_path")]
    pub path: PathBuf,

    /// Prefix stripped from reported paths (defaults to the scan root)
    #[serde(default)]
    pub strip_prefix: Option<PathBuf>,

    /// Overall time budget for one scan, in seconds
    #[serde(default = "default_time_budget_secs")]
    pub time_budget_secs: u64,

    /// Read buffer size for file hashing, in bytes
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Cap on simultaneous filesystem operations
    #[serde(default = "default_max_io")]
    pub max_io: usize,
}

/// Parameters of the polling agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Seconds between scheduled scans
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Startup delay before the first scheduled scan, in seconds
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

fn default_scan_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_time_budget_secs() -> u64 {
    300
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_max_io() -> usize {
    DEFAULT_MAX_IO
}

fn default_interval_secs() -> u64 {
    600
}

fn default_delay_secs() -> u64 {
    60
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            path: default_scan_path(),
            strip_prefix: None,
            time_budget_secs: default_time_budget_secs(),
            buffer_size: default_buffer_size(),
            max_io: default_max_io(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            delay_secs: default_delay_secs(),
        }
    }
}

impl ScanConfig {
    /// Convert to the scan options the digest engine consumes.
    pub fn to_options(&self) -> ScanOptions {
        let mut options = ScanOptions::new(self.path.clone())
            .with_time_budget(Duration::from_secs(self.time_budget_secs))
            .with_buffer_size(self.buffer_size)
            .with_max_io(self.max_io);
        if let Some(prefix) = &self.strip_prefix {
            options = options.with_strip_prefix(prefix.clone());
        }
        options
    }
}

impl AgentConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Loads layered configuration.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration, optionally from an explicit file path.
    ///
    /// With no explicit path, an XDG config file and a `treehash` file in the
    /// working directory are consulted if present; a missing file is not an
    /// error. Environment variables (`TREEHASH_SCAN__PATH`, ...) override
    /// file values.
    pub fn load(explicit: Option<&Path>) -> Result<TreehashConfig, ConfigError> {
        let mut builder = config::Config::builder();

        match explicit {
            Some(path) => {
                builder = builder.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                if let Some(dirs) = ProjectDirs::from("", "", "treehash") {
                    builder = builder.add_source(
                        config::File::from(dirs.config_dir().join("config.toml")).required(false),
                    );
                }
                builder = builder.add_source(config::File::with_name("treehash").required(false));
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix("TREEHASH")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build()?;
        Ok(settings.try_deserialize()?)
    }
}
