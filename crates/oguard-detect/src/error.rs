//! Detection error types.

use thiserror::Error;

/// Result type for detection operations.
pub type DetectResult<T> = Result<T, DetectError>;

/// Errors that can occur while sampling detections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectError {
    #[error("Capture source lost")]
    SourceLost,

    #[error("Inference failed: {0}")]
    InferenceFailed(String),
}

impl DetectError {
    pub fn inference_failed(msg: impl Into<String>) -> Self {
        Self::InferenceFailed(msg.into())
    }
}
