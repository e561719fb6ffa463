//! Inference backend boundary.

use async_trait::async_trait;

use oguard_capture::CaptureHandle;
use oguard_models::{DetectionResult, PresenceStatus};

use crate::error::DetectResult;

/// Pluggable inference backend.
///
/// Invoked once per sampler tick against the opaque capture handle; the
/// backend grabs its own frame. Treated as slow and fallible: a failure
/// terminates the sampling run and is surfaced, never retried here.
#[async_trait]
pub trait FrameDetector: Send + Sync {
    /// Produce one batch of raw detection results from the capture source.
    async fn detect(&self, handle: &CaptureHandle) -> DetectResult<Vec<DetectionResult>>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Configuration for detection post-processing.
#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
    /// Minimum confidence for a sighting to count
    pub confidence_threshold: f32,
    /// Whether to synthesize missing entries for absent critical classes
    pub audit_critical: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            audit_critical: true,
        }
    }
}

impl DetectorConfig {
    /// Drop low-confidence sightings from a raw batch.
    ///
    /// Only `Detected` results are thresholded: a non-detected status is an
    /// alert-bearing fact, not model noise, whatever its confidence.
    pub fn apply_threshold(&self, batch: Vec<DetectionResult>) -> Vec<DetectionResult> {
        batch
            .into_iter()
            .filter(|r| {
                r.status != PresenceStatus::Detected || r.confidence >= self.confidence_threshold
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oguard_models::BoundingBox;

    #[test]
    fn test_threshold_drops_weak_sightings() {
        let config = DetectorConfig::default();
        let bbox = BoundingBox::new(0.1, 0.1, 0.2, 0.2);
        let batch = vec![
            DetectionResult::sighted("fire_alarm", 0.9, bbox, PresenceStatus::Detected),
            DetectionResult::sighted("oxygen_tank", 0.1, bbox, PresenceStatus::Detected),
            DetectionResult::missing("emergency_phone"),
        ];

        let kept = config.apply_threshold(batch);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].class_id.as_str(), "fire_alarm");
        // Zero-confidence missing entries survive thresholding.
        assert_eq!(kept[1].class_id.as_str(), "emergency_phone");
    }
}
