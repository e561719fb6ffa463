//! Session configuration.

use std::time::Duration;

use oguard_detect::DetectorConfig;

/// Session configuration.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Cadence of camera sampling
    pub poll_interval: Duration,
    /// Fixed processing delay before an upload's one-shot batch
    pub upload_processing_delay: Duration,
    /// Maximum alert-history entries; oldest evicted first
    pub alert_history_limit: usize,
    /// Detection post-processing settings
    pub detector: DetectorConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            upload_processing_delay: Duration::from_millis(1500),
            alert_history_limit: 10,
            detector: DetectorConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: Duration::from_millis(
                std::env::var("OGUARD_POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.poll_interval.as_millis() as u64),
            ),
            upload_processing_delay: Duration::from_millis(
                std::env::var("OGUARD_UPLOAD_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.upload_processing_delay.as_millis() as u64),
            ),
            alert_history_limit: std::env::var("OGUARD_ALERT_HISTORY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.alert_history_limit),
            detector: DetectorConfig {
                confidence_threshold: std::env::var("OGUARD_CONFIDENCE_THRESHOLD")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.detector.confidence_threshold),
                audit_critical: std::env::var("OGUARD_AUDIT_CRITICAL")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(defaults.detector.audit_critical),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.upload_processing_delay, Duration::from_millis(1500));
        assert_eq!(config.alert_history_limit, 10);
        assert!(config.detector.audit_critical);
    }
}
