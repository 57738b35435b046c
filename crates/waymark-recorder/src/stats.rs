//! Queue statistics.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct Counters {
    accepted: AtomicU64,
    dropped: AtomicU64,
    forwarded: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    pub(crate) fn accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, current_size: usize, capacity: Option<usize>) -> QueueStats {
        QueueStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            current_size,
            capacity,
        }
    }
}

/// Snapshot of queueing recorder activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStats {
    /// Events accepted into the queue.
    pub accepted: u64,

    /// Events rejected because the queue was full.
    pub dropped: u64,

    /// Events handed to the wrapped recorder, successfully or not.
    pub forwarded: u64,

    /// Forwarded events the wrapped recorder failed to record.
    pub failed: u64,

    /// Events currently waiting.
    pub current_size: usize,

    /// Queue bound; `None` when unbounded.
    pub capacity: Option<usize>,
}

impl QueueStats {
    /// Calculate fill percentage. Always zero for an unbounded queue.
    pub fn fill_percentage(&self) -> f64 {
        match self.capacity {
            Some(capacity) => (self.current_size as f64 / capacity as f64) * 100.0,
            None => 0.0,
        }
    }

    /// Calculate drop rate as a percentage of all submissions.
    pub fn drop_rate(&self) -> f64 {
        let submitted = self.accepted + self.dropped;
        if submitted == 0 {
            0.0
        } else {
            (self.dropped as f64 / submitted as f64) * 100.0
        }
    }
}
