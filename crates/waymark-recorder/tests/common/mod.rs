//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::ThreadId;
use std::time::Duration;
use waymark_common_config::MemoryConfig;
use waymark_recorder::{
    ConfigSource, QueueObserver, Recorder, RecorderError, SubjectId, UserEvent, CONFIG_SECTION,
    MAX_QUEUE_SIZE_KEY,
};

/// Config with the given queue bound.
pub fn config_with_bound(bound: i64) -> MemoryConfig {
    MemoryConfig::new().with(CONFIG_SECTION, MAX_QUEUE_SIZE_KEY, bound)
}

/// An event whose subject name identifies it in assertions.
pub fn event(name: &str) -> UserEvent {
    UserEvent::region_enter(SubjectId::new(), name, "Harbor")
}

/// What a [`MemoryRecorder`] saw, shared with the test.
#[derive(Default)]
pub struct Log {
    pub initialised: AtomicUsize,
    pub events: Mutex<Vec<UserEvent>>,
    pub threads: Mutex<Vec<(ThreadId, Option<String>)>>,
}

impl Log {
    pub fn names(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .map(|e| e.subject_name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }
}

/// Records every event into a shared [`Log`].
pub struct MemoryRecorder {
    log: Arc<Log>,
    delay: Duration,
    fail_on: Option<String>,
    panic_on: Option<String>,
}

impl MemoryRecorder {
    pub fn new() -> (Self, Arc<Log>) {
        let log = Arc::new(Log::default());
        let recorder = Self {
            log: Arc::clone(&log),
            delay: Duration::ZERO,
            fail_on: None,
            panic_on: None,
        };
        (recorder, log)
    }

    /// Sleep this long inside every `record` call.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail events whose subject name is `name`.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.fail_on = Some(name.to_string());
        self
    }

    /// Panic on events whose subject name is `name`.
    pub fn panicking_on(mut self, name: &str) -> Self {
        self.panic_on = Some(name.to_string());
        self
    }
}

impl Recorder for MemoryRecorder {
    fn initialise(&mut self, _config: &dyn ConfigSource) -> Result<(), RecorderError> {
        self.log.initialised.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn record(&mut self, event: &UserEvent) -> Result<(), RecorderError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let current = std::thread::current();
        self.log
            .threads
            .lock()
            .push((current.id(), current.name().map(str::to_string)));

        if self.panic_on.as_deref() == Some(event.subject_name()) {
            panic!("cannot record {}", event.subject_name());
        }
        if self.fail_on.as_deref() == Some(event.subject_name()) {
            return Err(RecorderError::write("rejected by backend"));
        }

        self.log.events.lock().push(event.clone());
        Ok(())
    }
}

/// Captures observer callbacks.
#[derive(Default)]
pub struct CapturingObserver {
    pub warnings: Mutex<Vec<String>>,
    pub flushes: Mutex<Vec<usize>>,
    pub failures: Mutex<Vec<String>>,
}

impl CapturingObserver {
    pub fn warning_count(&self) -> usize {
        self.warnings.lock().len()
    }
}

impl QueueObserver for CapturingObserver {
    fn overflow(&self, event: &UserEvent, _bound: usize) {
        self.warnings.lock().push(event.subject_name().to_string());
    }

    fn flushing(&self, remaining: usize) {
        self.flushes.lock().push(remaining);
    }

    fn record_failed(&self, event: &UserEvent, _error: &RecorderError) {
        self.failures.lock().push(event.subject_name().to_string());
    }
}
