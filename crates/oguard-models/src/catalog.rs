//! Catalog of monitored safety-object classes.
//!
//! The catalog is a fixed registry loaded once at process start and never
//! mutated. Classes flagged as critical take part in coverage auditing:
//! their absence from a batch is itself an observation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a monitored object class (snake_case, e.g. `oxygen_tank`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ObjectClassId(pub String);

impl ObjectClassId {
    /// Create from an existing string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ObjectClassId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One monitored object class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonitoredObjectClass {
    /// Stable class identifier
    pub id: ObjectClassId,
    /// Human-readable name shown in alert messages
    pub display_name: String,
    /// Whether absence of this class must raise a critical alert
    pub critical: bool,
}

/// Fixed registry of monitored object classes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Catalog {
    classes: Vec<MonitoredObjectClass>,
}

impl Catalog {
    /// Build a catalog from an explicit class list.
    pub fn new(classes: Vec<MonitoredObjectClass>) -> Self {
        Self { classes }
    }

    /// The station safety-equipment catalog.
    pub fn builtin() -> Self {
        let entry = |id: &str, display_name: &str, critical: bool| MonitoredObjectClass {
            id: ObjectClassId::new(id),
            display_name: display_name.to_string(),
            critical,
        };

        Self::new(vec![
            entry("oxygen_tank", "Oxygen Tank", true),
            entry("nitrogen_tank", "Nitrogen Tank", false),
            entry("first_aid_box", "First Aid Box", true),
            entry("fire_alarm", "Fire Alarm", true),
            entry("safety_switch_panel", "Safety Switch Panel", false),
            entry("emergency_phone", "Emergency Phone", true),
            entry("fire_extinguisher", "Fire Extinguisher", true),
        ])
    }

    /// Look up a class by id.
    pub fn get(&self, id: &ObjectClassId) -> Option<&MonitoredObjectClass> {
        self.classes.iter().find(|c| &c.id == id)
    }

    /// Display name for a class id, if known.
    pub fn display_name(&self, id: &ObjectClassId) -> Option<&str> {
        self.get(id).map(|c| c.display_name.as_str())
    }

    /// Iterate classes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &MonitoredObjectClass> {
        self.classes.iter()
    }

    /// Iterate only the critical classes.
    pub fn critical(&self) -> impl Iterator<Item = &MonitoredObjectClass> {
        self.classes.iter().filter(|c| c.critical)
    }

    /// Number of monitored classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.critical().count(), 5);

        let id = ObjectClassId::new("fire_extinguisher");
        assert_eq!(catalog.display_name(&id), Some("Fire Extinguisher"));
        assert!(catalog.get(&id).is_some_and(|c| c.critical));
    }

    #[test]
    fn test_unknown_class_lookup() {
        let catalog = Catalog::builtin();
        assert!(catalog.get(&ObjectClassId::new("coffee_machine")).is_none());
    }

    #[test]
    fn test_class_id_serde_transparent() {
        let id = ObjectClassId::new("oxygen_tank");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"oxygen_tank\"");
    }
}
