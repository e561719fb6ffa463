//! Alert derivation from detection batches.

use oguard_models::{Alert, Catalog, DetectionResult};

/// Maps detection results to alerts.
///
/// Pure: the same batch always yields the same alerts up to `id` and
/// `created_at`, which are unique per invocation. Duplicate alerts for the
/// same class across consecutive batches are not deduplicated here; the
/// history bound is the store's concern.
#[derive(Debug, Clone)]
pub struct AlertClassifier {
    catalog: Catalog,
}

impl AlertClassifier {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Emit one alert per result whose status warrants one.
    ///
    /// Unknown class ids keep their raw identifier as the display name.
    pub fn classify(&self, batch: &[DetectionResult]) -> Vec<Alert> {
        batch
            .iter()
            .filter(|result| result.status.needs_alert())
            .map(|result| {
                let display_name = self
                    .catalog
                    .display_name(&result.class_id)
                    .unwrap_or_else(|| result.class_id.as_str());
                Alert::for_status(result.class_id.clone(), display_name, result.status)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oguard_models::{BoundingBox, PresenceStatus, Severity};

    fn classifier() -> AlertClassifier {
        AlertClassifier::new(Catalog::builtin())
    }

    #[test]
    fn test_detected_results_emit_nothing() {
        let bbox = BoundingBox::new(0.1, 0.1, 0.2, 0.2);
        let batch = vec![DetectionResult::sighted(
            "fire_alarm",
            0.9,
            bbox,
            PresenceStatus::Detected,
        )];
        assert!(classifier().classify(&batch).is_empty());
    }

    #[test]
    fn test_alert_per_non_detected_status() {
        let bbox = BoundingBox::new(0.1, 0.1, 0.2, 0.2);
        let batch = vec![
            DetectionResult::missing("oxygen_tank"),
            DetectionResult::sighted("first_aid_box", 0.8, bbox, PresenceStatus::Misplaced),
            DetectionResult::sighted("fire_alarm", 0.7, bbox, PresenceStatus::Obstructed),
            DetectionResult::sighted("fire_extinguisher", 0.9, bbox, PresenceStatus::Detected),
        ];

        let alerts = classifier().classify(&batch);
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].message, "Oxygen Tank is missing");
        assert_eq!(alerts[1].severity, Severity::Warning);
        assert_eq!(alerts[1].message, "First Aid Box is misplaced");
        assert_eq!(alerts[2].severity, Severity::Warning);
        assert_eq!(alerts[2].message, "Fire Alarm is obstructed");
    }

    #[test]
    fn test_unknown_class_falls_back_to_raw_id() {
        let batch = vec![DetectionResult::missing("oxygen_mask")];
        let alerts = classifier().classify(&batch);
        assert_eq!(alerts[0].message, "oxygen_mask is missing");
    }

    #[test]
    fn test_no_cross_batch_dedup() {
        let batch = vec![DetectionResult::missing("oxygen_tank")];
        let c = classifier();
        let first = c.classify(&batch);
        let second = c.classify(&batch);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_ne!(first[0].id, second[0].id);
        assert_eq!(first[0].message, second[0].message);
    }
}
