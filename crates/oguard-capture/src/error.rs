//! Capture error types.

use thiserror::Error;

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors that can occur while acquiring a capture resource.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("No video input device available: {0}")]
    DeviceUnavailable(String),

    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Unsupported media format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid capture request: {0}")]
    InvalidRequest(String),
}

impl CaptureError {
    pub fn device_unavailable(msg: impl Into<String>) -> Self {
        Self::DeviceUnavailable(msg.into())
    }

    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}
