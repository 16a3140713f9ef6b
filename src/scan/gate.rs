//! Completion tracking for the dynamically growing task tree

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Counts in-flight walk and hash tasks.
///
/// Every task is registered before it is spawned, so the count can never
/// transiently reach zero while a spawn is still being scheduled. Each
/// registration hands out one [`TaskGuard`]; dropping the guard is the only
/// way to deregister, which makes the pairing unconditional on success and
/// failure paths alike and rules out double-deregistration.
#[derive(Debug, Default)]
pub(crate) struct TaskGate {
    active: AtomicUsize,
    drained: Notify,
}

impl TaskGate {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register one task, before it is spawned.
    pub(crate) fn register(self: &Arc<Self>) -> TaskGuard {
        self.active.fetch_add(1, Ordering::AcqRel);
        TaskGuard {
            gate: Arc::clone(self),
        }
    }

    /// Wait until every registered task has deregistered.
    ///
    /// The notified future is created before the count is checked so a
    /// notification between check and await cannot be missed.
    pub(crate) async fn drained(&self) {
        loop {
            let notified = self.drained.notified();
            if self.active.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    #[cfg(test)]
    pub(crate) fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}

/// RAII registration for one task.
#[derive(Debug)]
pub(crate) struct TaskGuard {
    gate: Arc<TaskGate>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        let previous = self.gate.active.fetch_sub(1, Ordering::AcqRel);
        if previous == 0 {
            // Broken task accounting cannot be recovered from; a silent wrap
            // would hang or truncate every scan that follows.
            panic!("task gate underflow: more deregistrations than registrations");
        }
        if previous == 1 {
            self.gate.drained.notify_waiters();
        }
    }
}
