//! The recorder capability.

use thiserror::Error;
use waymark_common_config::{ConfigError, ConfigSource};
use waymark_event_types::UserEvent;

/// Errors reported by a recorder backend.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("recorder used before initialise")]
    NotInitialised,

    #[error("failed to write event: {0}")]
    Write(String),

    #[error("recorder panicked: {0}")]
    Panicked(String),
}

impl RecorderError {
    /// Create a write error.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }
}

/// A backend that durably records user events.
///
/// `record` may block and may fail. The queueing recorder never has more than
/// one call in flight, so implementations only need to be `Send`.
pub trait Recorder: Send + 'static {
    /// Prepare the backend from configuration.
    fn initialise(&mut self, config: &dyn ConfigSource) -> Result<(), RecorderError>;

    /// Record one event.
    ///
    /// Implementations log their own failures; callers do not retry.
    fn record(&mut self, event: &UserEvent) -> Result<(), RecorderError>;
}

impl<R: Recorder + ?Sized> Recorder for Box<R> {
    fn initialise(&mut self, config: &dyn ConfigSource) -> Result<(), RecorderError> {
        (**self).initialise(config)
    }

    fn record(&mut self, event: &UserEvent) -> Result<(), RecorderError> {
        (**self).record(event)
    }
}
