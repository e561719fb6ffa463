//! Critical-coverage auditing.

use oguard_models::{Catalog, DetectionResult};

/// Append a synthesized missing-object entry for every critical catalog
/// class with no observation in the batch.
///
/// Non-critical classes are never synthesized; an operator only needs to
/// hear about equipment whose absence is itself a hazard.
pub fn audit_coverage(batch: &mut Vec<DetectionResult>, catalog: &Catalog) {
    let absent: Vec<_> = catalog
        .critical()
        .filter(|class| !batch.iter().any(|r| r.class_id == class.id))
        .map(|class| class.id.clone())
        .collect();

    for class_id in absent {
        batch.push(DetectionResult::missing(class_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oguard_models::{BoundingBox, PresenceStatus};

    #[test]
    fn test_absent_critical_classes_become_missing() {
        let catalog = Catalog::builtin();
        let bbox = BoundingBox::new(0.1, 0.1, 0.2, 0.2);
        let mut batch = vec![
            DetectionResult::sighted("fire_extinguisher", 0.95, bbox, PresenceStatus::Detected),
            DetectionResult::sighted("oxygen_tank", 0.8, bbox, PresenceStatus::Obstructed),
        ];

        audit_coverage(&mut batch, &catalog);

        // 5 critical classes, 2 already observed -> 3 synthesized.
        assert_eq!(batch.len(), 5);
        let synthesized: Vec<_> = batch[2..].iter().collect();
        assert!(synthesized.iter().all(|r| {
            r.status == PresenceStatus::Missing && r.confidence == 0.0 && r.bounding_box.is_none()
        }));
        // Non-critical classes are left alone.
        assert!(!batch.iter().any(|r| r.class_id.as_str() == "nitrogen_tank"));
    }

    #[test]
    fn test_full_coverage_adds_nothing() {
        let catalog = Catalog::builtin();
        let bbox = BoundingBox::new(0.1, 0.1, 0.2, 0.2);
        let mut batch: Vec<_> = catalog
            .critical()
            .map(|c| {
                DetectionResult::sighted(c.id.as_str(), 0.9, bbox, PresenceStatus::Detected)
            })
            .collect();

        let before = batch.len();
        audit_coverage(&mut batch, &catalog);
        assert_eq!(batch.len(), before);
    }
}
