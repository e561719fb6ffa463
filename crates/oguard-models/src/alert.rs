//! Alerts derived from detection results.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::catalog::ObjectClassId;
use crate::detection::PresenceStatus;

/// Unique identifier for an alert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AlertId(pub String);

impl AlertId {
    /// Generate a new random alert ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Alert severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Object missing entirely
    Critical,
    /// Object present but misplaced or obstructed
    Warning,
}

impl Severity {
    /// Severity mandated by a presence status. `Critical` iff `Missing`.
    pub fn for_status(status: PresenceStatus) -> Self {
        match status {
            PresenceStatus::Missing => Severity::Critical,
            _ => Severity::Warning,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A derived alert fact. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Alert {
    /// Unique alert ID
    pub id: AlertId,
    /// Class the alert refers to
    pub class_id: ObjectClassId,
    /// Severity tier
    pub severity: Severity,
    /// Operator-facing message
    pub message: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Create an alert for an object with the given presence status.
    ///
    /// The message follows the `"<display name> is <status>"` convention.
    pub fn for_status(
        class_id: ObjectClassId,
        display_name: &str,
        status: PresenceStatus,
    ) -> Self {
        Self {
            id: AlertId::new(),
            class_id,
            severity: Severity::for_status(status),
            message: format!("{} is {}", display_name, status),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_invariant() {
        assert_eq!(Severity::for_status(PresenceStatus::Missing), Severity::Critical);
        assert_eq!(Severity::for_status(PresenceStatus::Misplaced), Severity::Warning);
        assert_eq!(Severity::for_status(PresenceStatus::Obstructed), Severity::Warning);
        assert_eq!(Severity::for_status(PresenceStatus::Detected), Severity::Warning);
    }

    #[test]
    fn test_alert_message_format() {
        let alert = Alert::for_status(
            ObjectClassId::new("oxygen_tank"),
            "Oxygen Tank",
            PresenceStatus::Missing,
        );
        assert_eq!(alert.message, "Oxygen Tank is missing");
        assert_eq!(alert.severity, Severity::Critical);
    }

    #[test]
    fn test_alert_ids_unique() {
        let a = AlertId::new();
        let b = AlertId::new();
        assert_ne!(a, b);
    }
}
