//! The queueing recorder.

use crate::observer::{QueueObserver, TracingObserver};
use crate::queue::{EventQueue, Offer, QueueBound};
use crate::stats::{Counters, QueueStats};
use crate::worker::{DrainWorker, WORKER_THREAD_NAME};
use crate::{QueueError, Recorder};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info};
use waymark_common_config::ConfigSource;
use waymark_event_types::UserEvent;

/// Handle to a running drain worker.
struct WorkerHandle {
    thread: JoinHandle<()>,
    cancel: Sender<()>,
    done: Receiver<()>,
}

/// Decorates a [`Recorder`] with a bounded queue and a background writer.
///
/// `submit` can be called from any number of threads. Events are forwarded to
/// the wrapped recorder by a single worker thread, in the order they were
/// accepted.
///
/// `stop` has no timeout: a wrapped recorder that never returns from
/// `record` blocks it forever. Callers that need a bounded shutdown must
/// impose their own deadline.
pub struct QueueingRecorder<R: Recorder> {
    queue: Arc<EventQueue>,
    running: Arc<AtomicBool>,
    recorder: Arc<Mutex<R>>,
    counters: Arc<Counters>,
    observer: Arc<dyn QueueObserver>,
    worker: Mutex<Option<WorkerHandle>>,
}

impl<R: Recorder> QueueingRecorder<R> {
    /// Build from configuration, logging through `tracing`.
    ///
    /// Reads `UserEventRecorder.MaxEventQueueSize`, then initialises the
    /// wrapped recorder with the same configuration. Any error leaves nothing
    /// running.
    pub fn initialise(recorder: R, config: &dyn ConfigSource) -> Result<Self, QueueError> {
        Self::initialise_with_observer(recorder, config, Arc::new(TracingObserver))
    }

    /// Build from configuration with a custom observer.
    pub fn initialise_with_observer(
        mut recorder: R,
        config: &dyn ConfigSource,
        observer: Arc<dyn QueueObserver>,
    ) -> Result<Self, QueueError> {
        let bound = QueueBound::from_config(config)?;
        recorder.initialise(config)?;

        info!(capacity = ?bound.capacity(), "event queue initialised");

        Ok(Self {
            queue: Arc::new(EventQueue::new(bound)),
            running: Arc::new(AtomicBool::new(false)),
            recorder: Arc::new(Mutex::new(recorder)),
            counters: Arc::new(Counters::default()),
            observer,
            worker: Mutex::new(None),
        })
    }

    /// Spawn the drain worker. Does nothing if it is already running.
    pub fn start(&self) -> Result<(), QueueError> {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Ok(());
        }

        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded(1);
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let drain = DrainWorker {
            queue: Arc::clone(&self.queue),
            running: Arc::clone(&self.running),
            recorder: Arc::clone(&self.recorder),
            counters: Arc::clone(&self.counters),
            observer: Arc::clone(&self.observer),
            cancel: cancel_rx,
            done: done_tx,
        };

        self.running.store(true, Ordering::SeqCst);
        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || drain.run())
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                QueueError::Spawn(e)
            })?;

        *worker = Some(WorkerHandle {
            thread,
            cancel: cancel_tx,
            done: done_rx,
        });
        Ok(())
    }

    /// Queue an event for recording.
    ///
    /// Returns `false` if the queue is full; the event is dropped. Works the
    /// same whether or not the worker is running.
    #[must_use = "a rejected event is dropped"]
    pub fn submit(&self, event: UserEvent) -> bool {
        match self.queue.offer(event) {
            Offer::Accepted => {
                self.counters.accepted();
                true
            }
            Offer::Rejected { event, warn } => {
                self.counters.dropped();
                if warn {
                    let bound = self.queue.bound().capacity().unwrap_or(usize::MAX);
                    self.observer.overflow(&event, bound);
                }
                false
            }
        }
    }

    /// Number of events waiting. A snapshot; may be stale immediately.
    pub fn count(&self) -> usize {
        self.queue.len()
    }

    /// Whether the worker has been started and not stopped.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The configured queue bound.
    pub fn bound(&self) -> QueueBound {
        self.queue.bound()
    }

    /// Activity counters and current fill.
    pub fn stats(&self) -> QueueStats {
        self.counters
            .snapshot(self.queue.len(), self.queue.bound().capacity())
    }

    /// Drain queued events, then stop the worker. Does nothing if not running.
    ///
    /// Blocks until the worker has exited. Once this returns, the wrapped
    /// recorder receives no further calls until the next `start`.
    pub fn stop(&self) {
        let mut worker = self.worker.lock();
        let Some(handle) = worker.take() else {
            return;
        };

        self.running.store(false, Ordering::SeqCst);

        let remaining = self.queue.len();
        if remaining == 0 {
            let _ = handle.cancel.try_send(());
        } else {
            self.observer.flushing(remaining);
        }

        // Disconnection means the worker exited without signalling.
        let _ = handle.done.recv();
        drop(handle.cancel);

        if handle.thread.join().is_err() {
            error!("event recorder worker panicked");
        }
        info!("event recorder stopped");
    }

    /// Stop and hand back the wrapped recorder.
    pub fn into_inner(self) -> Result<R, QueueError> {
        self.stop();
        let recorder = Arc::clone(&self.recorder);
        drop(self);

        Arc::try_unwrap(recorder)
            .map(Mutex::into_inner)
            .map_err(|_| QueueError::RecorderInUse)
    }
}

impl<R: Recorder> Drop for QueueingRecorder<R> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<R: Recorder> std::fmt::Debug for QueueingRecorder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueingRecorder")
            .field("bound", &self.queue.bound())
            .field("count", &self.queue.len())
            .field("running", &self.is_running())
            .finish()
    }
}
