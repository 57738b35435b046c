//! The background drain worker.

use crate::observer::QueueObserver;
use crate::queue::{EventQueue, WaitOutcome};
use crate::stats::Counters;
use crate::{Recorder, RecorderError};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};
use waymark_event_types::UserEvent;

/// Name given to the drain worker thread.
pub const WORKER_THREAD_NAME: &str = "waymark-event-recorder";

/// State moved into the worker thread.
pub(crate) struct DrainWorker<R> {
    pub(crate) queue: Arc<EventQueue>,
    pub(crate) running: Arc<AtomicBool>,
    pub(crate) recorder: Arc<Mutex<R>>,
    pub(crate) counters: Arc<Counters>,
    pub(crate) observer: Arc<dyn QueueObserver>,
    pub(crate) cancel: Receiver<()>,
    /// Completion signal. Dropping it (including on unwind) also counts.
    pub(crate) done: Sender<()>,
}

impl<R: Recorder> DrainWorker<R> {
    /// Drain until stopped and empty, or until cancelled.
    pub(crate) fn run(self) {
        info!("event recorder worker started");

        while self.running.load(Ordering::SeqCst) || !self.queue.is_empty() {
            let outcome = match self.queue.try_wait(&self.cancel) {
                WaitOutcome::WouldBlock => self.queue.wait(&self.cancel),
                ready => ready,
            };

            match outcome {
                WaitOutcome::Item(event) => self.forward(event),
                WaitOutcome::Cancelled => {
                    debug!("event recorder worker cancelled");
                    break;
                }
                WaitOutcome::WouldBlock => continue,
            }
        }

        info!(remaining = self.queue.len(), "event recorder worker finished");
        let _ = self.done.send(());
    }

    fn forward(&self, event: UserEvent) {
        let outcome = {
            let mut recorder = self.recorder.lock();
            catch_panic(AssertUnwindSafe(|| recorder.record(&event)))
        };
        self.counters.forwarded();

        let error = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(error)) => error,
            Err(panic) => {
                error!(kind = %event.kind(), subject = %event.subject_id(), %panic, "recorder panicked");
                RecorderError::Panicked(panic)
            }
        };

        self.counters.failed();
        self.observer.record_failed(&event, &error);
    }
}

/// Catch panics and convert to Result.
pub(crate) fn catch_panic<F, T>(f: F) -> Result<T, String>
where
    F: FnOnce() -> T + std::panic::UnwindSafe,
{
    std::panic::catch_unwind(f).map_err(|e| {
        if let Some(s) = e.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = e.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        }
    })
}
