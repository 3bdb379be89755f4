/// Statistics tracking for an event bus
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of a bus's counters and subscriber table.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusStats {
    /// Ordered (`publish`) dispatches that found at least one handler
    pub events_published: u64,
    /// Parallel (`publish_async`) dispatches that found at least one handler
    pub events_fanned_out: u64,
    /// Individual handler calls across both modes
    pub handler_invocations: u64,
    /// Handler calls that returned an error or panicked
    pub handler_failures: u64,
    /// Event types with at least one subscriber
    pub subscribed_types: usize,
    /// Subscribers across all types
    pub total_subscribers: usize,
    /// Entries in the replay log
    pub replay_len: usize,
}

#[derive(Debug, Default)]
pub(crate) struct BusCounters {
    pub events_published: AtomicU64,
    pub events_fanned_out: AtomicU64,
    pub handler_invocations: AtomicU64,
    pub handler_failures: AtomicU64,
}

impl BusCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.events_published.store(0, Ordering::Relaxed);
        self.events_fanned_out.store(0, Ordering::Relaxed);
        self.handler_invocations.store(0, Ordering::Relaxed);
        self.handler_failures.store(0, Ordering::Relaxed);
    }
}
