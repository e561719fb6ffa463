//! Session phase, snapshot and event schemas.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::alert::{Alert, Severity};
use crate::detection::{DetectionResult, PresenceStatus};

/// Phase of a monitoring session.
///
/// `Acquiring` and `Stopping` exist so a display layer can distinguish
/// "request sent" from "resource confirmed held/released" and disable
/// duplicate start/stop commands during the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No session running
    #[default]
    Idle,
    /// Capture resource requested, not yet held
    Acquiring,
    /// Resource held, sampling in progress
    Active,
    /// Teardown requested, resource not yet released
    Stopping,
}

impl SessionPhase {
    /// Get string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Acquiring => "acquiring",
            SessionPhase::Active => "active",
            SessionPhase::Stopping => "stopping",
        }
    }

    /// Whether a new session may be started from this phase.
    pub fn can_start(&self) -> bool {
        matches!(self, SessionPhase::Idle)
    }

    /// Whether the session holds or is about to hold a capture resource.
    pub fn is_running(&self) -> bool {
        matches!(self, SessionPhase::Acquiring | SessionPhase::Active)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read model handed to the presentation layer.
///
/// A defensive copy of the aggregate; holds no live references into
/// session internals.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct SessionSnapshot {
    /// Current phase
    pub phase: SessionPhase,
    /// Latest detection batch only, never an accumulation
    pub current_detections: Vec<DetectionResult>,
    /// Bounded alert history, oldest first
    pub alert_history: Vec<Alert>,
}

impl SessionSnapshot {
    /// Number of critical alerts in the history.
    pub fn critical_alert_count(&self) -> usize {
        self.alert_history
            .iter()
            .filter(|a| a.severity == Severity::Critical)
            .count()
    }

    /// Number of objects currently seen where expected.
    pub fn detected_count(&self) -> usize {
        self.current_detections
            .iter()
            .filter(|d| d.status == PresenceStatus::Detected)
            .count()
    }
}

/// Event emitted by the session store for the presentation adapter.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Session phase transition
    PhaseChanged {
        phase: SessionPhase,
        /// Terminal error that forced the transition, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// New alerts appended to the history
    AlertsAppended { alerts: Vec<Alert> },
}

impl SessionEvent {
    /// Create a phase-change event.
    pub fn phase_changed(phase: SessionPhase) -> Self {
        SessionEvent::PhaseChanged {
            phase,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a phase-change event carrying a terminal error.
    pub fn phase_changed_with_error(phase: SessionPhase, error: impl Into<String>) -> Self {
        SessionEvent::PhaseChanged {
            phase,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    /// Create an alerts-appended event.
    pub fn alerts_appended(alerts: Vec<Alert>) -> Self {
        SessionEvent::AlertsAppended { alerts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ObjectClassId;

    #[test]
    fn test_phase_helpers() {
        assert!(SessionPhase::Idle.can_start());
        assert!(!SessionPhase::Active.can_start());
        assert!(SessionPhase::Acquiring.is_running());
        assert!(!SessionPhase::Stopping.is_running());
    }

    #[test]
    fn test_snapshot_counts() {
        let snapshot = SessionSnapshot {
            phase: SessionPhase::Active,
            current_detections: vec![
                DetectionResult::missing("oxygen_tank"),
                DetectionResult {
                    class_id: ObjectClassId::new("fire_alarm"),
                    confidence: 0.9,
                    bounding_box: None,
                    status: PresenceStatus::Detected,
                },
            ],
            alert_history: vec![Alert::for_status(
                ObjectClassId::new("oxygen_tank"),
                "Oxygen Tank",
                PresenceStatus::Missing,
            )],
        };
        assert_eq!(snapshot.detected_count(), 1);
        assert_eq!(snapshot.critical_alert_count(), 1);
    }

    #[test]
    fn test_event_serde_tag() {
        let event = SessionEvent::phase_changed(SessionPhase::Active);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"phase_changed\""));
        assert!(json.contains("\"phase\":\"active\""));
        assert!(!json.contains("error"));
    }
}
