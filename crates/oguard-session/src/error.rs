//! Session error types.

use thiserror::Error;

use oguard_capture::CaptureError;
use oguard_detect::DetectError;
use oguard_models::SessionPhase;

/// Result type for session commands.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced by session commands.
///
/// Acquisition and sampling failures pass through unchanged so the caller
/// can decide whether to retry. None of these are fatal: a failed session
/// never prevents starting a new one.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Detection error: {0}")]
    Detect(#[from] DetectError),

    #[error("Session already running (phase: {0})")]
    NotIdle(SessionPhase),

    #[error("Session start cancelled by a stop request")]
    Cancelled,
}
