//! Capture-source command payloads.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Camera acquisition parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct CameraRequest {
    /// Requested frame width in pixels
    #[validate(range(min = 16, max = 7680))]
    pub width: u32,
    /// Requested frame height in pixels
    #[validate(range(min = 16, max = 7680))]
    pub height: u32,
}

impl CameraRequest {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Kind of uploaded media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Image extensions accepted for upload analysis.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

/// Video extensions accepted for upload analysis.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm", "avi"];

/// Reference to an uploaded media file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MediaRef {
    /// Original file name, including extension
    pub name: String,
}

impl MediaRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Lowercased file extension, if present.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    /// Media kind derived from the file extension; `None` when the file
    /// is neither a known image nor a known video.
    pub fn kind(&self) -> Option<MediaKind> {
        let ext = self.extension()?;
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// Input source for a monitoring session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaptureSource {
    /// Live camera feed at the requested resolution
    Camera(CameraRequest),
    /// One-shot analysis of an uploaded file
    Upload { media: MediaRef },
}

impl CaptureSource {
    /// Create a camera source.
    pub fn camera(width: u32, height: u32) -> Self {
        CaptureSource::Camera(CameraRequest::new(width, height))
    }

    /// Create an upload source.
    pub fn upload(name: impl Into<String>) -> Self {
        CaptureSource::Upload {
            media: MediaRef::new(name),
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            CaptureSource::Camera(_) => "camera",
            CaptureSource::Upload { .. } => "upload",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_request_validation() {
        assert!(CameraRequest::new(640, 480).validate().is_ok());
        assert!(CameraRequest::new(0, 480).validate().is_err());
        assert!(CameraRequest::new(640, 100_000).validate().is_err());
    }

    #[test]
    fn test_media_kind_from_extension() {
        assert_eq!(MediaRef::new("bay7.PNG").kind(), Some(MediaKind::Image));
        assert_eq!(MediaRef::new("sweep.mp4").kind(), Some(MediaKind::Video));
        assert_eq!(MediaRef::new("notes.txt").kind(), None);
        assert_eq!(MediaRef::new("no_extension").kind(), None);
    }

    #[test]
    fn test_source_serde_tag() {
        let source = CaptureSource::camera(640, 480);
        let json = serde_json::to_string(&source).unwrap();
        assert!(json.contains("\"kind\":\"camera\""));
        assert!(json.contains("\"width\":640"));

        let upload: CaptureSource =
            serde_json::from_str(r#"{"kind":"upload","media":{"name":"bay.mp4"}}"#).unwrap();
        assert_eq!(upload.kind_str(), "upload");
    }
}
