//! Polling Agent
//!
//! Recomputes the tree digest on a fixed schedule: a startup delay, then one
//! scan per interval. The agent records every run, detects digest changes
//! against the previous run, and keeps the latest report available to
//! callers. Deciding what to do about a change is the caller's business; the
//! agent only observes and logs.

use crate::error::ScanError;
use crate::scan::{scan, ScanOptions, ScanReport};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, error, info};

/// Outcome of one scheduled scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// First successful scan; there is no previous digest to compare against.
    Initial,
    /// The digest matches the previous run.
    Unchanged,
    /// The digest differs from the previous run.
    Changed,
}

/// Periodically recomputes the tree digest.
pub struct ScanAgent {
    options: ScanOptions,
    interval: Duration,
    delay: Duration,
    latest: RwLock<Option<Arc<ScanReport>>>,
}

impl ScanAgent {
    pub fn new(options: ScanOptions, interval: Duration, delay: Duration) -> Self {
        Self {
            options,
            interval,
            delay,
            latest: RwLock::new(None),
        }
    }

    /// The most recent successful report, if any run has completed.
    pub fn latest(&self) -> Option<Arc<ScanReport>> {
        self.latest.read().clone()
    }

    /// Run one scan, record the report, and compare against the previous run.
    pub async fn tick(&self) -> Result<TickOutcome, ScanError> {
        let report = scan(&self.options).await?;
        let digest_hex = report.digest_hex();
        let partial = report.is_partial();

        let outcome = {
            let mut latest = self.latest.write();
            let outcome = match latest.as_ref() {
                None => TickOutcome::Initial,
                Some(previous) if previous.digest == report.digest => TickOutcome::Unchanged,
                Some(_) => TickOutcome::Changed,
            };
            *latest = Some(Arc::new(report));
            outcome
        };

        match outcome {
            TickOutcome::Changed => {
                info!(digest = %digest_hex, partial, "tree digest changed");
            }
            TickOutcome::Initial => {
                info!(digest = %digest_hex, partial, "initial tree digest");
            }
            TickOutcome::Unchanged => {
                debug!(digest = %digest_hex, partial, "tree digest unchanged");
            }
        }

        Ok(outcome)
    }

    /// Sleep the startup delay, then scan once per interval until the task is
    /// cancelled. A failed run (including a timed-out walk) is logged and the
    /// schedule continues.
    pub async fn run(&self) {
        info!(
            interval_secs = self.interval.as_secs(),
            delay_secs = self.delay.as_secs(),
            "scan agent starting"
        );
        sleep(self.delay).await;

        let mut ticker = interval(self.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.tick().await {
                error!(error = %e, "scheduled scan failed");
            }
        }
    }
}
