//! Queueing recorder errors.

use crate::RecorderError;
use thiserror::Error;
use waymark_common_config::ConfigError;

/// Errors surfaced by [`QueueingRecorder`](crate::QueueingRecorder) setup and lifecycle.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("wrapped recorder failed to initialise: {0}")]
    Recorder(#[from] RecorderError),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("wrapped recorder is still held by a worker")]
    RecorderInUse,
}

impl QueueError {
    /// Check if this error was caused by bad configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Recorder(RecorderError::Config(_))
        )
    }
}
