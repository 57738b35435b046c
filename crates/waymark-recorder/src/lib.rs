//! Queueing event recorder for Waymark.
//!
//! Producers observe user events (logins, logouts, region entries) on
//! arbitrary threads and hand them to a [`QueueingRecorder`]. The queueing
//! recorder buffers them in a bounded queue and a single background worker
//! forwards them, one at a time and in submission order, to the wrapped
//! [`Recorder`] that performs the durable write.
//!
//! ```text
//! producers ── submit() ──▶ bounded queue ──▶ worker thread ──▶ Recorder::record()
//!                 │ full                            ▲
//!                 ▼                                 │ stop(): drain, then exit
//!           dropped + rate-limited warning
//! ```
//!
//! - Submitting never blocks beyond a short critical section.
//! - A full queue drops the event and returns `false`. A warning is emitted
//!   once per overflow episode.
//! - `stop()` drains every queued event before it returns.
//! - Failures and panics in the wrapped recorder are isolated per event.

mod error;
mod observer;
mod queue;
mod queueing;
mod recorder;
mod stats;
mod worker;

pub use error::QueueError;
pub use observer::{QueueObserver, TracingObserver};
pub use queue::QueueBound;
pub use queueing::QueueingRecorder;
pub use recorder::{Recorder, RecorderError};
pub use stats::QueueStats;
pub use worker::WORKER_THREAD_NAME;

// Re-export types for convenience
pub use waymark_common_config::{ConfigError, ConfigSource};
pub use waymark_event_types::{EventKind, SubjectId, UserEvent};

/// Configuration section read by the queueing recorder.
pub const CONFIG_SECTION: &str = "UserEventRecorder";

/// Key holding the queue bound. Absent means unbounded.
pub const MAX_QUEUE_SIZE_KEY: &str = "MaxEventQueueSize";
