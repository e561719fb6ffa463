//! Cadence-driven detection sampling.
//!
//! The sampler owns the session's timing: one batch per interval for a
//! camera handle, exactly one delayed batch for uploaded media. Delivery
//! rides a `watch` channel, so a consumer slower than the cadence always
//! observes the most recent batch and intermediate ones are dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use oguard_capture::{CaptureHandle, CaptureManager};
use oguard_models::{Catalog, DetectionResult};

use crate::coverage::audit_coverage;
use crate::detector::{DetectorConfig, FrameDetector};
use crate::error::{DetectError, DetectResult};

/// How a sampling run is paced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    /// One batch per interval until cancelled
    Continuous { interval: Duration },
    /// One batch after a fixed processing delay, then done
    OneShot { delay: Duration },
}

/// Event published by a sampling run.
#[derive(Debug, Clone)]
pub enum SamplerEvent {
    /// Nothing sampled yet
    Idle,
    /// A batch of post-processed detection results.
    ///
    /// `seq` increases by one per dispatched batch; `last` marks the final
    /// batch of a one-shot run.
    Batch {
        seq: u64,
        results: Vec<DetectionResult>,
        last: bool,
    },
    /// The run terminated abnormally. Emitted at most once.
    Failed(DetectError),
}

/// Control handle for a sampling run.
pub struct PollingHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollingHandle {
    /// Stop scheduling new batches. Idempotent; a batch already published
    /// stays observable on the event channel.
    pub fn cancel(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Whether the sampling task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Produces detection batches from a capture source on a cadence.
pub struct DetectionSampler {
    manager: Arc<CaptureManager>,
    detector: Arc<dyn FrameDetector>,
    catalog: Catalog,
    config: DetectorConfig,
}

impl DetectionSampler {
    pub fn new(
        manager: Arc<CaptureManager>,
        detector: Arc<dyn FrameDetector>,
        catalog: Catalog,
        config: DetectorConfig,
    ) -> Self {
        Self {
            manager,
            detector,
            catalog,
            config,
        }
    }

    /// Begin a sampling run over an acquired handle.
    ///
    /// Returns the control handle and the event channel. Dropping the
    /// control handle cancels the run.
    pub fn start(
        &self,
        handle: CaptureHandle,
        mode: SamplingMode,
    ) -> (PollingHandle, watch::Receiver<SamplerEvent>) {
        let (event_tx, event_rx) = watch::channel(SamplerEvent::Idle);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = SamplerWorker {
            manager: Arc::clone(&self.manager),
            detector: Arc::clone(&self.detector),
            catalog: self.catalog.clone(),
            config: self.config,
            handle,
            events: event_tx,
        };

        info!(
            handle = %worker.handle,
            detector = self.detector.name(),
            ?mode,
            "Sampling started"
        );
        let task = tokio::spawn(worker.run(mode, shutdown_rx));

        (
            PollingHandle {
                shutdown: shutdown_tx,
                task,
            },
            event_rx,
        )
    }
}

struct SamplerWorker {
    manager: Arc<CaptureManager>,
    detector: Arc<dyn FrameDetector>,
    catalog: Catalog,
    config: DetectorConfig,
    handle: CaptureHandle,
    events: watch::Sender<SamplerEvent>,
}

impl SamplerWorker {
    async fn run(self, mode: SamplingMode, mut shutdown: watch::Receiver<bool>) {
        match mode {
            SamplingMode::OneShot { delay } => self.run_one_shot(delay, &mut shutdown).await,
            SamplingMode::Continuous { interval } => {
                self.run_continuous(interval, &mut shutdown).await
            }
        }
        debug!(handle = %self.handle, "Sampling task exited");
    }

    async fn run_one_shot(&self, delay: Duration, shutdown: &mut watch::Receiver<bool>) {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!(handle = %self.handle, "One-shot run cancelled before dispatch");
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }

        if !self.manager.is_live(&self.handle).await {
            let _ = self.events.send(SamplerEvent::Failed(DetectError::SourceLost));
            return;
        }

        match self.sample().await {
            Ok(results) => {
                let _ = self.events.send(SamplerEvent::Batch {
                    seq: 1,
                    results,
                    last: true,
                });
            }
            Err(err) => {
                error!(handle = %self.handle, "One-shot sampling failed: {}", err);
                let _ = self.events.send(SamplerEvent::Failed(err));
            }
        }
    }

    async fn run_continuous(&self, interval: Duration, shutdown: &mut watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        // A slow consumer must not cause a burst of catch-up batches.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of a tokio interval completes immediately; the
        // cadence starts one interval after the run begins.
        ticker.tick().await;

        let mut seq = 0u64;
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    debug!(handle = %self.handle, "Polling cancelled");
                    return;
                }
                _ = ticker.tick() => {
                    if !self.manager.is_live(&self.handle).await {
                        warn!(handle = %self.handle, "Capture source lost, stopping sampler");
                        let _ = self.events.send(SamplerEvent::Failed(DetectError::SourceLost));
                        return;
                    }
                    match self.sample().await {
                        Ok(results) => {
                            seq += 1;
                            let _ = self.events.send(SamplerEvent::Batch { seq, results, last: false });
                        }
                        Err(err) => {
                            error!(handle = %self.handle, "Sampling failed: {}", err);
                            let _ = self.events.send(SamplerEvent::Failed(err));
                            return;
                        }
                    }
                }
            }
        }
    }

    async fn sample(&self) -> DetectResult<Vec<DetectionResult>> {
        let raw = self.detector.detect(&self.handle).await?;
        let mut batch = self.config.apply_threshold(raw);
        if self.config.audit_critical {
            audit_coverage(&mut batch, &self.catalog);
        }
        Ok(batch)
    }
}
