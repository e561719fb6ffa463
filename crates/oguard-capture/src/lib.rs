//! Capture resource management.
//!
//! This crate owns the session's one exclusively-held resource: the video
//! input. It provides:
//! - Scoped acquisition of a camera device or uploaded media file
//! - Idempotent release, safe on every session exit path
//! - A registry of live handles so samplers can detect source loss

pub mod error;
pub mod handle;
pub mod manager;

pub use error::{CaptureError, CaptureResult};
pub use handle::{CaptureHandle, CaptureKind};
pub use manager::{CameraAccess, CaptureManager, DeviceId, SimulatedCameraAccess};
