//! Shared data models for the Orbital Guard monitoring core.
//!
//! This crate provides Serde-serializable types for:
//! - The monitored-object catalog
//! - Detection results and bounding boxes
//! - Alerts and severity tiers
//! - Session phase, snapshot and event schemas
//! - Capture-source command payloads

pub mod alert;
pub mod catalog;
pub mod detection;
pub mod session;
pub mod source;

// Re-export common types
pub use alert::{Alert, AlertId, Severity};
pub use catalog::{Catalog, MonitoredObjectClass, ObjectClassId};
pub use detection::{BoundingBox, DetectionResult, PresenceStatus};
pub use session::{SessionEvent, SessionPhase, SessionSnapshot};
pub use source::{CameraRequest, CaptureSource, MediaKind, MediaRef};
