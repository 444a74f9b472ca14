use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use kanal::AsyncSender;
use mirror_camera::{CameraController, CameraDevice, CameraState, FrameCapture, StreamConstraints};
use mirror_config::Config;
use mirror_config::camera::CameraConfig;
use mirror_detect::{DetectionService, HttpDetectionClient};
use mirror_types::{
    AppEvent, DetectionResult, Route, ServiceHealth, TransitionState, WorkflowSnapshot,
    WorkflowStatus,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::guard::InFlightGuard;

#[derive(Debug)]
pub enum DetectOutcome {
    /// Another attempt was already in flight, nothing was sent
    Rejected,
    Detected(DetectionResult),
    Failed(WorkflowError),
}

/// Drives one face detection view: camera, health check, detection attempts
/// and the hand-off to the results view.
///
/// Status changes are published as [`AppEvent::StatusUpdate`], the hand-off as
/// [`AppEvent::Navigate`]. No failure escapes [`DetectionWorkflow::detect_mood`].
pub struct DetectionWorkflow {
    camera: Mutex<CameraController>,
    capture: FrameCapture,
    service: Arc<dyn DetectionService>,
    events: AsyncSender<AppEvent>,
    snapshot: RwLock<WorkflowSnapshot>,
    /// Held from snapshot change to send, so updates go out in the order they happen
    publishing: Mutex<()>,
    in_flight: AtomicBool,
    mounted: AtomicBool,
}

impl DetectionWorkflow {
    pub fn new(
        device: Arc<dyn CameraDevice>,
        service: Arc<dyn DetectionService>,
        camera_config: &CameraConfig,
        events: AsyncSender<AppEvent>,
    ) -> Self {
        let constraints = StreamConstraints::video(camera_config.width, camera_config.height);

        Self {
            camera: Mutex::new(CameraController::new(device, constraints)),
            capture: FrameCapture::new(
                camera_config.width,
                camera_config.height,
                camera_config.jpeg_quality,
            ),
            service,
            events,
            snapshot: RwLock::new(WorkflowSnapshot::default()),
            publishing: Mutex::new(()),
            in_flight: AtomicBool::new(false),
            mounted: AtomicBool::new(false),
        }
    }

    /// Workflow talking to the configured HTTP detection service
    pub fn from_config(
        config: &Config,
        device: Arc<dyn CameraDevice>,
        events: AsyncSender<AppEvent>,
    ) -> Self {
        let service = Arc::new(HttpDetectionClient::new(config.service.clone()));
        Self::new(device, service, &config.camera, events)
    }

    /// View mount: reset state, check the service in the background, start the camera.
    ///
    /// Returns the health check task; it never needs to be awaited.
    pub async fn mount(self: &Arc<Self>) -> JoinHandle<()> {
        self.mounted.store(true, Ordering::SeqCst);
        self.update(|s| *s = WorkflowSnapshot::default());

        let health_check = tokio::spawn({
            let workflow = self.clone();
            async move {
                workflow.check_service_health().await;
            }
        });

        self.start_camera().await;
        health_check
    }

    /// View teardown. Releases the camera even while a detection is in flight.
    pub async fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        self.camera.lock().await.stop();
        tracing::debug!("[WORKFLOW] Unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub async fn start_camera(&self) {
        self.set(|s| {
            s.status = WorkflowStatus::Starting;
            s.error = None;
        })
        .await;

        let (state, error) = {
            let mut camera = self.camera.lock().await;
            let state = camera.start().await;
            (state, camera.error().cloned())
        };

        match state {
            CameraState::On => self.set(|s| s.status = WorkflowStatus::CameraOn).await,
            _ => {
                let message = error
                    .map(WorkflowError::from)
                    .unwrap_or(WorkflowError::CaptureUnavailable)
                    .user_message(self.service.base_url());
                self.set(|s| {
                    s.status = WorkflowStatus::Error;
                    s.error = Some(message);
                })
                .await;
            }
        }
    }

    /// Informational only, never blocks detection
    pub async fn check_service_health(&self) -> ServiceHealth {
        self.set(|s| s.health = ServiceHealth::Checking).await;

        let health = match self.service.check_health().await {
            Ok(()) => {
                tracing::info!("Detection service reachable at {}", self.service.base_url());
                ServiceHealth::Ok
            }
            Err(e) => {
                tracing::warn!(
                    "Detection service at {} unreachable: {}",
                    self.service.base_url(),
                    e
                );
                ServiceHealth::Unreachable
            }
        };

        self.set(|s| s.health = health).await;
        health
    }

    /// Capture a frame, submit it and hand the result to the results view.
    ///
    /// At most one attempt runs at a time; overlapping calls return
    /// [`DetectOutcome::Rejected`] without touching camera or service.
    pub async fn detect_mood(&self) -> DetectOutcome {
        let Some(slot) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("[WORKFLOW] Detection already in flight, ignoring");
            return DetectOutcome::Rejected;
        };
        let cleanup = AttemptCleanup {
            workflow: self,
            slot: Some(slot),
            finished: false,
        };

        let attempt = Uuid::new_v4();
        let outcome = self
            .attempt()
            .instrument(tracing::info_span!("detect_mood", %attempt))
            .await;

        cleanup.finish().await;
        outcome
    }

    async fn attempt(&self) -> DetectOutcome {
        self.set(|s| {
            s.status = WorkflowStatus::Detecting;
            s.error = None;
            s.loading = true;
        })
        .await;

        match self.run_detection().await {
            Ok(result) => {
                tracing::info!(
                    "Detected mood '{}' (confidence: {:?}, source: {})",
                    result.mood(),
                    result.confidence(),
                    result.source()
                );
                let mood = result.mood().to_string();
                self.set(|s| s.status = WorkflowStatus::Detected(mood)).await;

                if self.is_mounted() {
                    let event = AppEvent::Navigate {
                        route: Route::GeneratedPlaylist,
                        state: Some(TransitionState::from(result.clone())),
                    };
                    if let Err(e) = self.events.send(event).await {
                        tracing::error!("Failed to hand off detection result: {}", e);
                    }
                } else {
                    tracing::info!("View unmounted before detection finished, staying put");
                }

                DetectOutcome::Detected(result)
            }
            Err(e) => {
                tracing::warn!("Detection failed: {}", e);
                let message = e.user_message(self.service.base_url());
                self.set(|s| {
                    s.status = WorkflowStatus::Error;
                    s.error = Some(message);
                })
                .await;
                DetectOutcome::Failed(e)
            }
        }
    }

    /// Capture strictly before submission, submission strictly before interpretation
    async fn run_detection(&self) -> Result<DetectionResult, WorkflowError> {
        let frame = {
            let camera = self.camera.lock().await;
            self.capture.capture_frame(camera.preview())
        }
        .ok_or(WorkflowError::CaptureUnavailable)?;

        tracing::debug!("Submitting {:?}", frame);
        let result = self.service.detect(&frame.to_data_uri()).await?;
        Ok(result)
    }

    pub async fn dismiss_error(&self) {
        self.set(|s| s.error = None).await;
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.snapshot
            .read()
            .map(|s| s.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn is_detecting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub async fn camera_state(&self) -> CameraState {
        self.camera.lock().await.state()
    }

    pub async fn has_camera_stream(&self) -> bool {
        self.camera.lock().await.has_stream()
    }

    fn update(&self, f: impl FnOnce(&mut WorkflowSnapshot)) -> WorkflowSnapshot {
        let mut snapshot = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        f(&mut snapshot);
        snapshot.clone()
    }

    /// Change the snapshot and publish the result
    async fn set(&self, f: impl FnOnce(&mut WorkflowSnapshot)) {
        let _publishing = self.publishing.lock().await;
        let snapshot = self.update(f);
        self.publish(snapshot).await;
    }

    async fn publish(&self, snapshot: WorkflowSnapshot) {
        if let Err(e) = self.events.send(AppEvent::StatusUpdate(snapshot)).await {
            tracing::debug!("Status update dropped: {}", e);
        }
    }
}

/// Clears the loading indicator and frees the detection slot when an attempt
/// ends. [`AttemptCleanup::finish`] is the normal path; dropping an unfinished
/// cleanup (the attempt's future was cancelled) does the same without waiting.
struct AttemptCleanup<'a> {
    workflow: &'a DetectionWorkflow,
    slot: Option<InFlightGuard<'a>>,
    finished: bool,
}

impl AttemptCleanup<'_> {
    async fn finish(mut self) {
        let workflow = self.workflow;
        let _publishing = workflow.publishing.lock().await;
        let snapshot = workflow.update(|s| s.loading = false);
        drop(self.slot.take());
        self.finished = true;
        workflow.publish(snapshot).await;
    }
}

impl Drop for AttemptCleanup<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let snapshot = self.workflow.update(|s| s.loading = false);
        drop(self.slot.take());
        if let Err(e) = self
            .workflow
            .events
            .try_send(AppEvent::StatusUpdate(snapshot))
        {
            tracing::debug!("Final status update of a cancelled attempt dropped: {}", e);
        }
    }
}
