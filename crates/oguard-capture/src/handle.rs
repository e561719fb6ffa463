//! Opaque capture handles.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of capture resource a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureKind {
    /// Exclusive camera device
    Camera,
    /// Uploaded media file
    Upload,
}

impl CaptureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureKind::Camera => "camera",
            CaptureKind::Upload => "upload",
        }
    }
}

/// Opaque reference to an acquired capture resource.
///
/// The handle is only a key into the manager's registry; it does not own
/// the underlying device. Cloning a handle never duplicates the resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureHandle {
    id: Uuid,
    kind: CaptureKind,
}

impl CaptureHandle {
    pub(crate) fn new(kind: CaptureKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
        }
    }

    /// Registry key for this handle.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Kind of resource behind the handle.
    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    /// Whether the handle refers to a live camera feed.
    pub fn is_camera(&self) -> bool {
        self.kind == CaptureKind::Camera
    }
}

impl fmt::Display for CaptureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_identity() {
        let a = CaptureHandle::new(CaptureKind::Camera);
        let b = CaptureHandle::new(CaptureKind::Camera);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert!(a.is_camera());
    }
}
