//! Deterministic aggregation of per-file digests

use super::walker::WalkEvent;
use super::{FileRecord, ScanFailure};
use crate::types::Digest;
use serde::{Serialize, Serializer};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

/// Result of one tree scan.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    /// Root digest over the sorted per-file digests.
    #[serde(serialize_with = "super::serialize_digest")]
    pub digest: Digest,
    /// Per-file records, sorted byte-wise by path.
    pub files: Vec<FileRecord>,
    /// Per-item failures collected during the walk.
    pub failures: Vec<ScanFailure>,
    /// Wall-clock duration of the walk and fold.
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
}

impl ScanReport {
    /// Hex-encoded root digest.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// True when at least one file or directory could not be processed.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Drain the result stream until the walk closes it.
pub(crate) async fn drain(
    stream: &mut mpsc::Receiver<WalkEvent>,
) -> (Vec<FileRecord>, Vec<ScanFailure>) {
    let mut records = Vec::new();
    let mut failures = Vec::new();

    while let Some(event) = stream.recv().await {
        match event {
            WalkEvent::Record(record) => records.push(record),
            WalkEvent::Failure(failure) => {
                warn!(
                    path = %failure.path,
                    stage = ?failure.stage,
                    error = %failure.error,
                    "scan item failed"
                );
                failures.push(failure);
            }
        }
    }

    (records, failures)
}

/// Sort records byte-wise by path and fold them into the root digest.
///
/// Sorting is what restores determinism: concurrent tasks emit records in
/// whatever order they finish. Each fold step feeds the length-prefixed path
/// and the content digest, never raw file content, so a rename changes the
/// root digest even when content is unchanged.
pub(crate) fn fold(
    mut records: Vec<FileRecord>,
    failures: Vec<ScanFailure>,
    duration: Duration,
) -> ScanReport {
    records.sort_by(|a, b| a.path.as_bytes().cmp(b.path.as_bytes()));

    let mut hasher = blake3::Hasher::new();
    for record in &records {
        hasher.update(&(record.path.len() as u64).to_be_bytes());
        hasher.update(record.path.as_bytes());
        hasher.update(&record.digest);
    }

    ScanReport {
        digest: *hasher.finalize().as_bytes(),
        files: records,
        failures,
        duration,
    }
}
