//! Observability hooks for the queueing recorder.

use crate::RecorderError;
use tracing::{debug, info, warn};
use waymark_event_types::UserEvent;

/// Receives notable queue conditions.
///
/// Injected at construction so callers decide where warnings go. The default
/// is [`TracingObserver`].
pub trait QueueObserver: Send + Sync {
    /// An event was dropped because the queue was full.
    ///
    /// Called once per overflow episode: further drops are suppressed until a
    /// submission succeeds again.
    fn overflow(&self, event: &UserEvent, bound: usize);

    /// `stop()` found `remaining` events still queued and is waiting for them.
    fn flushing(&self, remaining: usize) {
        let _ = remaining;
    }

    /// The wrapped recorder rejected an event.
    fn record_failed(&self, event: &UserEvent, error: &RecorderError) {
        let _ = (event, error);
    }
}

/// Emits queue conditions through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl QueueObserver for TracingObserver {
    fn overflow(&self, event: &UserEvent, bound: usize) {
        warn!(
            kind = %event.kind(),
            subject = %event.subject_id(),
            subject_name = event.subject_name(),
            bound,
            "event queue full, dropping events until space frees up"
        );
    }

    fn flushing(&self, remaining: usize) {
        info!(remaining, "flushing queued events before stopping");
    }

    fn record_failed(&self, event: &UserEvent, error: &RecorderError) {
        debug!(kind = %event.kind(), subject = %event.subject_id(), %error, "event not recorded");
    }
}
