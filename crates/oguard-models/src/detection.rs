//! Detection results produced by one sampling tick.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::ObjectClassId;

/// Observed presence of a monitored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    /// Object seen where expected
    #[default]
    Detected,
    /// Object not seen at all
    Missing,
    /// Object seen in the wrong place
    Misplaced,
    /// Object seen but partially blocked
    Obstructed,
}

impl PresenceStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceStatus::Detected => "detected",
            PresenceStatus::Missing => "missing",
            PresenceStatus::Misplaced => "misplaced",
            PresenceStatus::Obstructed => "obstructed",
        }
    }

    /// Whether this status must raise an alert.
    pub fn needs_alert(&self) -> bool {
        !matches!(self, PresenceStatus::Detected)
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A normalized rectangle (0.0 to 1.0) locating an object within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    /// X coordinate of the top-left corner (0.0 = left, 1.0 = right)
    pub x: f64,
    /// Y coordinate of the top-left corner (0.0 = top, 1.0 = bottom)
    pub y: f64,
    /// Width of the rectangle (0.0 to 1.0)
    pub width: f64,
    /// Height of the rectangle (0.0 to 1.0)
    pub height: f64,
}

impl BoundingBox {
    /// Create a new normalized bounding box.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Check if the box is valid (within 0.0-1.0 range).
    pub fn is_valid(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width > 0.0
            && self.height > 0.0
            && self.x + self.width <= 1.001 // Allow small epsilon for float precision
            && self.y + self.height <= 1.001
    }

    /// Get the center point in normalized coordinates.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// One observation of one monitored object class.
///
/// Immutable after creation; the session store replaces its detection set
/// wholesale on every sampling tick, so results never accumulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionResult {
    /// Class this observation refers to
    pub class_id: ObjectClassId,
    /// Model confidence in [0, 1]
    pub confidence: f32,
    /// Localization, absent for synthesized missing-object entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    /// Observed presence
    #[serde(default)]
    pub status: PresenceStatus,
}

impl DetectionResult {
    /// Create a sighting with a bounding box.
    pub fn sighted(
        class_id: impl Into<ObjectClassId>,
        confidence: f32,
        bounding_box: BoundingBox,
        status: PresenceStatus,
    ) -> Self {
        Self {
            class_id: class_id.into(),
            confidence,
            bounding_box: Some(bounding_box),
            status,
        }
    }

    /// Create a synthesized missing-object observation.
    pub fn missing(class_id: impl Into<ObjectClassId>) -> Self {
        Self {
            class_id: class_id.into(),
            confidence: 0.0,
            bounding_box: None,
            status: PresenceStatus::Missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_status_alerting() {
        assert!(!PresenceStatus::Detected.needs_alert());
        assert!(PresenceStatus::Missing.needs_alert());
        assert!(PresenceStatus::Misplaced.needs_alert());
        assert!(PresenceStatus::Obstructed.needs_alert());
    }

    #[test]
    fn test_presence_status_serde() {
        let json = serde_json::to_string(&PresenceStatus::Misplaced).unwrap();
        assert_eq!(json, "\"misplaced\"");
        let back: PresenceStatus = serde_json::from_str("\"obstructed\"").unwrap();
        assert_eq!(back, PresenceStatus::Obstructed);
    }

    #[test]
    fn test_bounding_box_validity() {
        assert!(BoundingBox::new(0.1, 0.2, 0.3, 0.4).is_valid());
        assert!(!BoundingBox::new(-0.1, 0.2, 0.3, 0.4).is_valid());
        assert!(!BoundingBox::new(0.8, 0.2, 0.4, 0.1).is_valid());
        assert!(!BoundingBox::new(0.1, 0.2, 0.0, 0.4).is_valid());
    }

    #[test]
    fn test_missing_result_shape() {
        let result = DetectionResult::missing("oxygen_tank");
        assert_eq!(result.confidence, 0.0);
        assert!(result.bounding_box.is_none());
        assert_eq!(result.status, PresenceStatus::Missing);
    }
}
