//! Simulated inference backend.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use oguard_capture::CaptureHandle;
use oguard_models::{BoundingBox, Catalog, DetectionResult, PresenceStatus};

use crate::detector::FrameDetector;
use crate::error::{DetectError, DetectResult};

/// Results produced per simulated frame.
const RESULTS_PER_FRAME: usize = 2;

/// Detector that fabricates plausible observations over the catalog.
///
/// Stands in for a real model during demos and tests: each invocation
/// emits a couple of random-class sightings with high confidence and a
/// presence draw weighted toward `Detected`.
pub struct SimulatedDetector {
    catalog: Catalog,
    rng: Mutex<StdRng>,
}

impl SimulatedDetector {
    /// Create a detector seeded from system entropy.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Create a deterministic detector for tests.
    pub fn with_seed(catalog: Catalog, seed: u64) -> Self {
        Self {
            catalog,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn draw_status(rng: &mut StdRng) -> PresenceStatus {
        let roll: f64 = rng.random_range(0.0..1.0);
        if roll < 0.70 {
            PresenceStatus::Detected
        } else if roll < 0.85 {
            PresenceStatus::Missing
        } else if roll < 0.95 {
            PresenceStatus::Misplaced
        } else {
            PresenceStatus::Obstructed
        }
    }
}

#[async_trait]
impl FrameDetector for SimulatedDetector {
    async fn detect(&self, handle: &CaptureHandle) -> DetectResult<Vec<DetectionResult>> {
        let classes: Vec<_> = self.catalog.iter().collect();
        if classes.is_empty() {
            return Err(DetectError::inference_failed("empty catalog"));
        }

        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut results = Vec::with_capacity(RESULTS_PER_FRAME);
        for _ in 0..RESULTS_PER_FRAME {
            let class = classes[rng.random_range(0..classes.len())];
            let status = Self::draw_status(&mut rng);
            let bbox = BoundingBox::new(
                rng.random_range(0.0..0.6),
                rng.random_range(0.0..0.6),
                rng.random_range(0.1..0.3),
                rng.random_range(0.1..0.3),
            );
            results.push(DetectionResult::sighted(
                class.id.as_str(),
                rng.random_range(0.7..1.0),
                bbox,
                status,
            ));
        }

        debug!(handle = %handle, count = results.len(), "Simulated detection batch");
        Ok(results)
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oguard_capture::CaptureManager;
    use oguard_models::CaptureSource;

    async fn upload_handle() -> (CaptureManager, CaptureHandle) {
        let manager = CaptureManager::simulated();
        let handle = manager
            .acquire(&CaptureSource::upload("frame.png"))
            .await
            .unwrap();
        (manager, handle)
    }

    #[tokio::test]
    async fn test_batch_shape() {
        let (_manager, handle) = upload_handle().await;
        let detector = SimulatedDetector::with_seed(Catalog::builtin(), 7);

        let batch = detector.detect(&handle).await.unwrap();
        assert_eq!(batch.len(), RESULTS_PER_FRAME);
        for result in &batch {
            assert!(result.confidence >= 0.7 && result.confidence < 1.0);
            assert!(result.bounding_box.is_some_and(|b| b.is_valid()));
        }
    }

    #[tokio::test]
    async fn test_seeded_runs_are_deterministic() {
        let (_manager, handle) = upload_handle().await;

        let first = SimulatedDetector::with_seed(Catalog::builtin(), 42)
            .detect(&handle)
            .await
            .unwrap();
        let second = SimulatedDetector::with_seed(Catalog::builtin(), 42)
            .detect(&handle)
            .await
            .unwrap();
        assert_eq!(first, second);
    }
}
