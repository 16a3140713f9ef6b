//! Concurrent directory tree digesting
//!
//! Walks a directory tree concurrently, hashes every file with BLAKE3, and
//! folds the sorted per-file digests into one root digest. Rerunning over an
//! unmodified tree always yields the same digest regardless of scheduling;
//! any change to file content, names, or the file set changes it.

mod aggregate;
mod entry;
mod gate;
mod hasher;
mod path;
mod walker;

pub use aggregate::ScanReport;
pub use entry::{list_children, Entry};
pub use hasher::{hash_file, DEFAULT_BUFFER_SIZE};

use crate::error::ScanError;
use crate::types::Digest;
use gate::TaskGate;
use serde::{Serialize, Serializer};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::Instant;
use tracing::{info, instrument};
use walker::WalkContext;

/// Capacity of the result stream between walk tasks and the aggregator.
const RESULT_STREAM_CAPACITY: usize = 1024;

/// Default cap on simultaneous filesystem operations.
pub const DEFAULT_MAX_IO: usize = 64;

/// Default overall time budget for one scan.
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(300);

/// Where in the pipeline a per-item failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// A directory could not be opened or listed; its subtree is missing.
    List,
    /// A file could not be opened or read; it is excluded from the fold.
    Read,
}

/// A per-item failure, collected into the report instead of aborting the run.
#[derive(Debug, Serialize)]
pub struct ScanFailure {
    /// Path relative to the scan root.
    pub path: String,
    pub stage: FailureStage,
    #[serde(serialize_with = "serialize_io_error")]
    pub error: io::Error,
}

/// One hashed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Path relative to the scan root, `/`-separated.
    pub path: String,
    /// BLAKE3 digest of the file content.
    #[serde(serialize_with = "serialize_digest")]
    pub digest: Digest,
}

/// Options for one tree scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Root directory to walk.
    pub root: PathBuf,
    /// Prefix stripped from reported paths (default: the scan root itself).
    pub strip_prefix: Option<PathBuf>,
    /// Overall time budget for the walk.
    pub time_budget: Duration,
    /// Read buffer size for file hashing.
    pub buffer_size: usize,
    /// Cap on simultaneous filesystem operations.
    pub max_io: usize,
}

impl ScanOptions {
    /// Options with defaults for everything but the root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            strip_prefix: None,
            time_budget: DEFAULT_TIME_BUDGET,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_io: DEFAULT_MAX_IO,
        }
    }

    /// Report paths relative to `prefix` instead of the scan root.
    pub fn with_strip_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.strip_prefix = Some(prefix.into());
        self
    }

    /// Bound the whole walk by `budget`.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Set the read buffer size for file hashing.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Cap simultaneous filesystem operations.
    pub fn with_max_io(mut self, max_io: usize) -> Self {
        self.max_io = max_io;
        self
    }
}

/// Walk `options.root`, hash every file, and fold the results into the root
/// digest.
#[instrument(skip(options), fields(root = %options.root.display()))]
pub async fn scan(options: &ScanOptions) -> Result<ScanReport, ScanError> {
    let started = Instant::now();
    let (root, base) = path::resolve_root(&options.root, options.strip_prefix.as_deref())?;
    let deadline = started
        .checked_add(options.time_budget)
        .unwrap_or_else(|| Instant::now() + Duration::from_secs(86_400 * 365 * 30));

    let (results, mut stream) = mpsc::channel(RESULT_STREAM_CAPACITY);
    let gate = TaskGate::new();
    let timed_out = Arc::new(AtomicBool::new(false));
    let ctx = Arc::new(WalkContext {
        buffer_size: options.buffer_size.max(1),
        deadline,
        timed_out: Arc::clone(&timed_out),
        gate: Arc::clone(&gate),
        io_slots: Semaphore::new(options.max_io.max(1)),
        results: results.clone(),
    });

    // Register-before-spawn, from the root down.
    let root_guard = gate.register();
    tokio::spawn(walker::walk_directory(ctx, root, base, root_guard));

    // The stream is closed exactly once, when the task tree drains.
    tokio::spawn(async move {
        gate.drained().await;
        drop(results);
    });

    let drained = tokio::time::timeout_at(deadline, aggregate::drain(&mut stream)).await;
    let (records, failures) = drained.map_err(|_| ScanError::DeadlineExceeded {
        budget: options.time_budget,
    })?;

    // A walk that stopped spawning on the deadline closes the stream cleanly;
    // that is still a timeout, never a silently partial digest.
    if timed_out.load(Ordering::Acquire) {
        return Err(ScanError::DeadlineExceeded {
            budget: options.time_budget,
        });
    }

    let report = aggregate::fold(records, failures, started.elapsed());
    info!(
        file_count = report.files.len(),
        failure_count = report.failures.len(),
        digest = %report.digest_hex(),
        duration_ms = report.duration.as_millis() as u64,
        "scan completed"
    );
    Ok(report)
}

fn serialize_digest<S>(digest: &Digest, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(digest))
}

fn serialize_io_error<S>(error: &io::Error, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&error.to_string())
}
