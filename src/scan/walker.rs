//! Concurrent tree walking
//!
//! One task per discovered directory and per discovered file. Every task is
//! registered with the task gate before it is spawned and deregisters through
//! its guard when it exits, on success and failure paths alike. Simultaneous
//! filesystem operations are bounded by a semaphore so deep trees cannot
//! exhaust file descriptors.

use super::entry::{self, Entry};
use super::gate::{TaskGate, TaskGuard};
use super::hasher;
use super::path;
use super::{FailureStage, FileRecord, ScanFailure};
use futures::future::{BoxFuture, FutureExt};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::Instant;
use tracing::trace;

/// One item on the result stream.
#[derive(Debug)]
pub(crate) enum WalkEvent {
    Record(FileRecord),
    Failure(ScanFailure),
}

/// Shared state for one walk, owned by the tasks it spawns.
pub(crate) struct WalkContext {
    pub(crate) buffer_size: usize,
    pub(crate) deadline: Instant,
    pub(crate) timed_out: Arc<AtomicBool>,
    pub(crate) gate: Arc<TaskGate>,
    pub(crate) io_slots: Semaphore,
    pub(crate) results: mpsc::Sender<WalkEvent>,
}

impl WalkContext {
    /// Check the deadline; once it has passed, the walk is incomplete and the
    /// run must fail with a timeout instead of a partial digest.
    fn expired(&self) -> bool {
        if Instant::now() >= self.deadline {
            self.timed_out.store(true, Ordering::Release);
            return true;
        }
        false
    }

    async fn report(&self, event: WalkEvent) {
        // A send failure only means the drain side is gone (deadline hit);
        // the event has nowhere to go.
        let _ = self.results.send(event).await;
    }
}

/// Scan one directory and fan out over its children.
///
/// Boxed because the walk recurses through itself when it spawns subdirectory
/// tasks.
pub(crate) fn walk_directory(
    ctx: Arc<WalkContext>,
    dir: PathBuf,
    rel: String,
    guard: TaskGuard,
) -> BoxFuture<'static, ()> {
    async move {
        let _guard = guard;
        if ctx.expired() {
            return;
        }

        let listing = {
            let Ok(_slot) = ctx.io_slots.acquire().await else {
                return;
            };
            entry::list_children(&dir).await
        };

        let children = match listing {
            Ok(children) => children,
            Err(error) => {
                // The subtree below this directory is missing from the run;
                // siblings continue unaffected.
                ctx.report(WalkEvent::Failure(ScanFailure {
                    path: rel,
                    stage: FailureStage::List,
                    error,
                }))
                .await;
                return;
            }
        };

        for child in children {
            if ctx.expired() {
                // Stop spawning; the drain side reports the timeout.
                return;
            }
            match child {
                Entry::Directory { path: child_path, name } => {
                    let child_rel = path::join_relative(&rel, &name);
                    let guard = ctx.gate.register();
                    tokio::spawn(walk_directory(Arc::clone(&ctx), child_path, child_rel, guard));
                }
                Entry::File { path: child_path, name } => {
                    let child_rel = path::join_relative(&rel, &name);
                    let guard = ctx.gate.register();
                    tokio::spawn(digest_file(Arc::clone(&ctx), child_path, child_rel, guard));
                }
            }
        }
    }
    .boxed()
}

/// Hash one file and emit its record.
async fn digest_file(ctx: Arc<WalkContext>, file_path: PathBuf, rel: String, guard: TaskGuard) {
    let _guard = guard;
    if ctx.expired() {
        return;
    }
    let Ok(_slot) = ctx.io_slots.acquire().await else {
        return;
    };

    let buffer_size = ctx.buffer_size;
    let joined =
        tokio::task::spawn_blocking(move || hasher::hash_file(&file_path, buffer_size)).await;
    let result = match joined {
        Ok(result) => result,
        Err(join_error) => {
            if join_error.is_panic() {
                std::panic::resume_unwind(join_error.into_panic());
            }
            // Runtime shutting down; nothing left to report to.
            return;
        }
    };

    let event = match result {
        Ok(digest) => {
            trace!(path = %rel, digest = %hex::encode(digest), "hashed file");
            WalkEvent::Record(FileRecord { path: rel, digest })
        }
        Err(error) => WalkEvent::Failure(ScanFailure {
            path: rel,
            stage: FailureStage::Read,
            error,
        }),
    };
    ctx.report(event).await;
}
