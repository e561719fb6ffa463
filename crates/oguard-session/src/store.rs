//! Session state store.
//!
//! Single owner of the session aggregate. Commands and batch ingestion
//! mutate the aggregate under a short-lived write lock with no suspension
//! points held across it; readers take `snapshot` without ever pausing
//! ingestion. Stale deliveries (a sampler tick racing a stop, a handle
//! resolving after a cancelled start) are fenced by a monotonically
//! increasing session generation.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use validator::Validate;

use oguard_capture::{CaptureError, CaptureHandle, CaptureManager};
use oguard_detect::{
    DetectError, DetectionSampler, FrameDetector, PollingHandle, SamplerEvent, SamplingMode,
    SimulatedDetector,
};
use oguard_models::{
    Alert, Catalog, CaptureSource, DetectionResult, SessionEvent, SessionPhase, SessionSnapshot,
};

use crate::classifier::AlertClassifier;
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};

/// Capacity of the session event channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Mutable session aggregate. Exactly one per store.
struct SessionState {
    phase: SessionPhase,
    /// Bumped on every start/stop/failure; fences stale deliveries
    generation: u64,
    current_detections: Vec<DetectionResult>,
    alert_history: VecDeque<Alert>,
    capture: Option<CaptureHandle>,
    polling: Option<PollingHandle>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            generation: 0,
            current_detections: Vec::new(),
            alert_history: VecDeque::new(),
            capture: None,
            polling: None,
        }
    }
}

struct StoreInner {
    config: SessionConfig,
    manager: Arc<CaptureManager>,
    sampler: DetectionSampler,
    classifier: AlertClassifier,
    state: RwLock<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

/// Single source of truth for a monitoring session.
///
/// Cheaply cloneable; all clones share one aggregate.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl SessionStore {
    /// Create a store over the given capture manager and inference backend.
    pub fn new(
        config: SessionConfig,
        manager: Arc<CaptureManager>,
        detector: Arc<dyn FrameDetector>,
        catalog: Catalog,
    ) -> Self {
        let sampler = DetectionSampler::new(
            Arc::clone(&manager),
            detector,
            catalog.clone(),
            config.detector,
        );
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(StoreInner {
                config,
                manager,
                sampler,
                classifier: AlertClassifier::new(catalog),
                state: RwLock::new(SessionState::new()),
                events,
            }),
        }
    }

    /// Create a store backed by the simulated camera and detector, over the
    /// builtin catalog. Demo and test convenience.
    pub fn simulated(config: SessionConfig) -> Self {
        let catalog = Catalog::builtin();
        Self::new(
            config,
            Arc::new(CaptureManager::simulated()),
            Arc::new(SimulatedDetector::new(catalog.clone())),
            catalog,
        )
    }

    /// Start a monitoring session over the given source.
    ///
    /// Transitions `Idle -> Acquiring -> Active`. On any failure the phase
    /// returns to `Idle`, anything acquired is released, and the underlying
    /// error is surfaced unchanged.
    pub async fn start_session(&self, source: CaptureSource) -> SessionResult<()> {
        if let CaptureSource::Camera(request) = &source {
            request
                .validate()
                .map_err(|e| CaptureError::invalid_request(e.to_string()))?;
        }

        let generation = {
            let mut st = self.state_write();
            if !st.phase.can_start() {
                return Err(SessionError::NotIdle(st.phase));
            }
            st.phase = SessionPhase::Acquiring;
            st.generation += 1;
            // Alert history is scoped to the session being started.
            st.alert_history.clear();
            st.generation
        };
        info!(source = source.kind_str(), "Session starting");
        self.emit(SessionEvent::phase_changed(SessionPhase::Acquiring));

        let handle = match self.inner.manager.acquire(&source).await {
            Ok(handle) => handle,
            Err(err) => {
                let transitioned = {
                    let mut st = self.state_write();
                    if st.generation == generation {
                        st.phase = SessionPhase::Idle;
                        true
                    } else {
                        false
                    }
                };
                warn!("Acquisition failed: {}", err);
                if transitioned {
                    self.emit(SessionEvent::phase_changed_with_error(
                        SessionPhase::Idle,
                        err.to_string(),
                    ));
                }
                return Err(err.into());
            }
        };

        // A stop may have raced the acquisition; release the late handle on
        // the spot and never let it reach the session.
        if self.generation_moved(generation) {
            info!(handle = %handle, "Start cancelled during acquisition");
            self.inner.manager.release(&handle).await;
            return Err(SessionError::Cancelled);
        }

        let mode = match &source {
            CaptureSource::Camera(_) => SamplingMode::Continuous {
                interval: self.inner.config.poll_interval,
            },
            CaptureSource::Upload { .. } => SamplingMode::OneShot {
                delay: self.inner.config.upload_processing_delay,
            },
        };
        let (polling, sampler_events) = self.inner.sampler.start(handle.clone(), mode);

        // Release the write lock before any suspension point: thread the
        // capture/polling handles back out of the guarded scope on the
        // cancel path so the teardown await happens with no guard held.
        let cancelled = {
            let mut st = self.state_write();
            if st.generation != generation {
                Some((polling, handle))
            } else {
                st.phase = SessionPhase::Active;
                st.capture = Some(handle);
                st.polling = Some(polling);
                None
            }
        };
        if let Some((polling, handle)) = cancelled {
            polling.cancel();
            self.inner.manager.release(&handle).await;
            return Err(SessionError::Cancelled);
        }
        self.spawn_ingest(generation, sampler_events);
        info!("Session active");
        self.emit(SessionEvent::phase_changed(SessionPhase::Active));
        Ok(())
    }

    /// Stop the session. Safe to call in any phase, any number of times.
    ///
    /// `Active -> Stopping -> Idle`; polling is cancelled, the capture
    /// handle released, current detections cleared. The alert history
    /// survives until the next `start_session` or `clear_alerts`. A stop
    /// during `Acquiring` goes straight to `Idle` and the in-flight
    /// acquisition is discarded when it resolves.
    pub async fn stop_session(&self) {
        enum Teardown {
            None,
            AbortAcquire,
            Stop {
                polling: Option<PollingHandle>,
                handle: Option<CaptureHandle>,
            },
        }

        let teardown = {
            let mut st = self.state_write();
            match st.phase {
                SessionPhase::Idle | SessionPhase::Stopping => Teardown::None,
                SessionPhase::Acquiring => {
                    st.generation += 1;
                    st.phase = SessionPhase::Idle;
                    Teardown::AbortAcquire
                }
                SessionPhase::Active => {
                    st.generation += 1;
                    st.phase = SessionPhase::Stopping;
                    st.current_detections.clear();
                    Teardown::Stop {
                        polling: st.polling.take(),
                        handle: st.capture.take(),
                    }
                }
            }
        };

        match teardown {
            Teardown::None => {}
            Teardown::AbortAcquire => {
                info!("Stop requested mid-acquisition; session will not go active");
                self.emit(SessionEvent::phase_changed(SessionPhase::Idle));
            }
            Teardown::Stop { polling, handle } => {
                self.emit(SessionEvent::phase_changed(SessionPhase::Stopping));
                if let Some(polling) = polling {
                    polling.cancel();
                }
                if let Some(handle) = handle {
                    self.inner.manager.release(&handle).await;
                }
                {
                    let mut st = self.state_write();
                    if st.phase == SessionPhase::Stopping {
                        st.phase = SessionPhase::Idle;
                    }
                }
                info!("Session stopped");
                self.emit(SessionEvent::phase_changed(SessionPhase::Idle));
            }
        }
    }

    /// Merge one detection batch into the session.
    ///
    /// Replaces the current detections wholesale and appends classifier
    /// output to the bounded alert history. Applies only while `Active`;
    /// batches racing a stop are discarded untouched.
    pub fn on_batch(&self, batch: Vec<DetectionResult>) {
        let generation = self.state_read().generation;
        self.apply_batch(generation, batch);
    }

    /// Empty the alert history.
    pub fn clear_alerts(&self) {
        let mut st = self.state_write();
        st.alert_history.clear();
    }

    /// Read-only view of the aggregate. Never blocks ingestion.
    pub fn snapshot(&self) -> SessionSnapshot {
        let st = self.state_read();
        SessionSnapshot {
            phase: st.phase,
            current_detections: st.current_detections.clone(),
            alert_history: st.alert_history.iter().cloned().collect(),
        }
    }

    /// Current session phase.
    pub fn phase(&self) -> SessionPhase {
        self.state_read().phase
    }

    /// Subscribe to session events (`PhaseChanged`, `AlertsAppended`).
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    fn apply_batch(&self, generation: u64, results: Vec<DetectionResult>) {
        let alerts = self.inner.classifier.classify(&results);
        let appended = {
            let mut st = self.state_write();
            if st.phase != SessionPhase::Active || st.generation != generation {
                debug!(generation, "Discarding batch for inactive session");
                return;
            }
            st.current_detections = results;
            for alert in &alerts {
                st.alert_history.push_back(alert.clone());
            }
            let limit = self.inner.config.alert_history_limit;
            while st.alert_history.len() > limit {
                st.alert_history.pop_front();
            }
            !alerts.is_empty()
        };
        if appended {
            self.emit(SessionEvent::alerts_appended(alerts));
        }
    }

    fn spawn_ingest(&self, generation: u64, mut events: watch::Receiver<SamplerEvent>) {
        let store = self.clone();
        tokio::spawn(async move {
            loop {
                if events.changed().await.is_err() {
                    break;
                }
                let event = events.borrow_and_update().clone();
                match event {
                    SamplerEvent::Idle => {}
                    SamplerEvent::Batch { seq, results, last } => {
                        debug!(seq, count = results.len(), "Batch received");
                        store.apply_batch(generation, results);
                        if last {
                            // Upload run complete; the session stays active
                            // with its last-known detections.
                            break;
                        }
                    }
                    SamplerEvent::Failed(err) => {
                        store.handle_failure(generation, err).await;
                        break;
                    }
                }
            }
        });
    }

    /// Terminal sampler failure: tear the session down and surface the
    /// error on the event feed. Resources are released before anything is
    /// reported.
    async fn handle_failure(&self, generation: u64, err: DetectError) {
        let (polling, handle) = {
            let mut st = self.state_write();
            if st.generation != generation {
                return;
            }
            st.generation += 1;
            st.phase = SessionPhase::Idle;
            st.current_detections.clear();
            (st.polling.take(), st.capture.take())
        };
        if let Some(polling) = polling {
            polling.cancel();
        }
        if let Some(handle) = handle {
            self.inner.manager.release(&handle).await;
        }
        warn!("Session terminated: {}", err);
        self.emit(SessionEvent::phase_changed_with_error(
            SessionPhase::Idle,
            err.to_string(),
        ));
    }

    fn generation_moved(&self, generation: u64) -> bool {
        self.state_read().generation != generation
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.inner.events.send(event);
    }

    fn state_read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn state_write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
