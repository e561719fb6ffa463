//! Capture resource manager.
//!
//! Acquisition is the only suspending operation in this crate: opening a
//! camera may wait on an external permission prompt. Release is synchronous
//! bookkeeping plus a device close, and is idempotent per handle.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use oguard_models::CaptureSource;

use crate::error::{CaptureError, CaptureResult};
use crate::handle::{CaptureHandle, CaptureKind};

/// Platform identifier of an opened video device.
pub type DeviceId = String;

/// Platform camera layer.
///
/// `open` may suspend on an external permission prompt; implementations map
/// denial to `CaptureError::PermissionDenied` and absence of a device to
/// `CaptureError::DeviceUnavailable`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CameraAccess: Send + Sync {
    /// Request exclusive access to a video input at the given resolution.
    async fn open(&self, width: u32, height: u32) -> CaptureResult<DeviceId>;

    /// Close a previously opened device.
    async fn close(&self, device: &DeviceId);

    /// Access-layer name for logging.
    fn name(&self) -> &'static str;
}

/// Camera access layer that always grants, for demos and tests.
#[derive(Debug, Default)]
pub struct SimulatedCameraAccess;

#[async_trait]
impl CameraAccess for SimulatedCameraAccess {
    async fn open(&self, width: u32, height: u32) -> CaptureResult<DeviceId> {
        let device = format!("sim-cam-{}x{}", width, height);
        debug!(device = %device, "Simulated camera opened");
        Ok(device)
    }

    async fn close(&self, device: &DeviceId) {
        debug!(device = %device, "Simulated camera closed");
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

/// Registry entry for a live handle.
struct HandleEntry {
    /// Device to close on release; `None` for uploaded media
    device: Option<DeviceId>,
    /// Human-readable source descriptor for logging
    descriptor: String,
}

/// Manages acquisition and release of capture resources.
///
/// Owns every acquired resource; sessions hold only opaque handles. Once
/// `acquire` succeeds, `release` closes the underlying device exactly once
/// no matter how many times it is invoked for the handle.
pub struct CaptureManager {
    access: Arc<dyn CameraAccess>,
    live: RwLock<HashMap<Uuid, HandleEntry>>,
}

impl CaptureManager {
    /// Create a manager over the given camera access layer.
    pub fn new(access: Arc<dyn CameraAccess>) -> Self {
        Self {
            access,
            live: RwLock::new(HashMap::new()),
        }
    }

    /// Create a manager backed by the simulated camera layer.
    pub fn simulated() -> Self {
        Self::new(Arc::new(SimulatedCameraAccess))
    }

    /// Acquire a capture resource for the given source.
    ///
    /// Camera sources request exclusive device access (may suspend on a
    /// permission prompt). Upload sources validate the media format and
    /// never touch a device.
    pub async fn acquire(&self, source: &CaptureSource) -> CaptureResult<CaptureHandle> {
        match source {
            CaptureSource::Camera(request) => {
                let device = self.access.open(request.width, request.height).await?;
                let handle = CaptureHandle::new(CaptureKind::Camera);
                let descriptor = format!("camera {}x{}", request.width, request.height);

                let mut live = self.live.write().await;
                live.insert(
                    handle.id(),
                    HandleEntry {
                        device: Some(device),
                        descriptor: descriptor.clone(),
                    },
                );

                info!(
                    handle = %handle,
                    access = self.access.name(),
                    "Capture resource acquired: {}", descriptor
                );
                Ok(handle)
            }
            CaptureSource::Upload { media } => {
                let kind = media
                    .kind()
                    .ok_or_else(|| CaptureError::unsupported_format(&media.name))?;
                let handle = CaptureHandle::new(CaptureKind::Upload);
                let descriptor = format!("{} upload {:?}", kind.as_str(), media.name);

                let mut live = self.live.write().await;
                live.insert(
                    handle.id(),
                    HandleEntry {
                        device: None,
                        descriptor: descriptor.clone(),
                    },
                );

                info!(handle = %handle, "Capture resource acquired: {}", descriptor);
                Ok(handle)
            }
        }
    }

    /// Release a capture resource.
    ///
    /// Idempotent: releasing an unknown or already-released handle is a
    /// no-op. The underlying device is closed at most once per handle.
    pub async fn release(&self, handle: &CaptureHandle) {
        let entry = {
            let mut live = self.live.write().await;
            live.remove(&handle.id())
        };

        match entry {
            Some(entry) => {
                if let Some(device) = entry.device {
                    self.access.close(&device).await;
                }
                info!(handle = %handle, "Capture resource released: {}", entry.descriptor);
            }
            None => {
                debug!(handle = %handle, "Release of unheld handle ignored");
            }
        }
    }

    /// Whether the handle still refers to a held resource.
    pub async fn is_live(&self, handle: &CaptureHandle) -> bool {
        self.live.read().await.contains_key(&handle.id())
    }

    /// Number of currently held resources.
    pub async fn live_count(&self) -> usize {
        self.live.read().await.len()
    }

    /// Release everything still held. Teardown aid for process shutdown.
    pub async fn release_all(&self) {
        let entries: Vec<(Uuid, HandleEntry)> = {
            let mut live = self.live.write().await;
            live.drain().collect()
        };
        for (id, entry) in entries {
            if let Some(device) = entry.device {
                self.access.close(&device).await;
            }
            warn!(handle_id = %id, "Capture resource force-released: {}", entry.descriptor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_acquire_and_release() {
        let manager = CaptureManager::simulated();
        let source = CaptureSource::upload("bay7.mp4");

        let handle = manager.acquire(&source).await.unwrap();
        assert!(!handle.is_camera());
        assert!(manager.is_live(&handle).await);
        assert_eq!(manager.live_count().await, 1);

        manager.release(&handle).await;
        assert!(!manager.is_live(&handle).await);
        assert_eq!(manager.live_count().await, 0);
    }

    #[tokio::test]
    async fn test_upload_unsupported_format() {
        let manager = CaptureManager::simulated();
        let err = manager
            .acquire(&CaptureSource::upload("manifest.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::UnsupportedFormat(_)));
        assert_eq!(manager.live_count().await, 0);
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let manager = CaptureManager::simulated();
        let handle = manager
            .acquire(&CaptureSource::camera(640, 480))
            .await
            .unwrap();

        manager.release(&handle).await;
        manager.release(&handle).await;
        manager.release(&handle).await;
        assert_eq!(manager.live_count().await, 0);
    }

    #[tokio::test]
    async fn test_camera_device_closed_exactly_once() {
        let mut access = MockCameraAccess::new();
        access
            .expect_open()
            .times(1)
            .returning(|_, _| Ok("cam-0".to_string()));
        access.expect_close().times(1).return_const(());
        access.expect_name().return_const("mock");

        let manager = CaptureManager::new(Arc::new(access));
        let handle = manager
            .acquire(&CaptureSource::camera(640, 480))
            .await
            .unwrap();

        manager.release(&handle).await;
        manager.release(&handle).await;
    }

    #[tokio::test]
    async fn test_permission_denied_allocates_nothing() {
        let mut access = MockCameraAccess::new();
        access
            .expect_open()
            .times(1)
            .returning(|_, _| Err(CaptureError::PermissionDenied));
        access.expect_name().return_const("mock");

        let manager = CaptureManager::new(Arc::new(access));
        let err = manager
            .acquire(&CaptureSource::camera(640, 480))
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::PermissionDenied));
        assert_eq!(manager.live_count().await, 0);
    }
}
