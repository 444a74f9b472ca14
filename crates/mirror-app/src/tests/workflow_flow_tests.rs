use std::sync::{Arc, Mutex};
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use mirror_camera::{
    CameraDevice, CameraError, MediaStreamHandle, MediaTrack, StillImageDevice, StreamConstraints,
};
use mirror_config::Config;
use mirror_config::camera::CameraConfig;
use mirror_config::service::ServiceConfig;
use mirror_detect::testing::{MockDetectionServer, MockResponse};
use mirror_types::{
    AppEvent, Mood, Route, TransitionState, WorkflowSnapshot, WorkflowStatus,
};
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::controller::ChannelSet;
use crate::events::event_loop;
use crate::state::AppState;

/// Still image camera that remembers every track it handed out
struct TrackingDevice {
    inner: StillImageDevice,
    tracks: Mutex<Vec<Arc<dyn MediaTrack>>>,
}

impl TrackingDevice {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: StillImageDevice::test_pattern(64, 36),
            tracks: Mutex::new(Vec::new()),
        })
    }

    fn acquired(&self) -> usize {
        self.tracks.lock().unwrap().len()
    }

    fn all_stopped(&self) -> bool {
        self.tracks.lock().unwrap().iter().all(|t| !t.is_live())
    }
}

#[async_trait::async_trait]
impl CameraDevice for TrackingDevice {
    fn name(&self) -> &str {
        "tracking"
    }

    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<MediaStreamHandle, CameraError> {
        let handle = self.inner.acquire(constraints).await?;
        self.tracks
            .lock()
            .unwrap()
            .extend(handle.tracks().iter().cloned());
        Ok(handle)
    }
}

struct Harness {
    to_ui: AsyncReceiver<AppEvent>,
    inbox: AsyncSender<AppEvent>,
    cancel: CancellationToken,
    task: JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    fn start(config: Config, camera: Arc<dyn CameraDevice>) -> Self {
        let channels = ChannelSet::new(&config);
        let state = Arc::new(AppState::new(config, camera));
        let cancel = CancellationToken::new();

        let task = tokio::spawn(event_loop(
            state,
            channels.ui_to_app.1.clone(),
            channels.sinks(),
            cancel.clone(),
        ));

        Self {
            to_ui: channels.app_to_ui.1.clone(),
            inbox: channels.ui_to_app.0.clone(),
            cancel,
            task,
        }
    }

    async fn send(&self, event: AppEvent) {
        self.inbox.send(event).await.expect("send failed");
    }

    /// Next view change, skipping status updates
    async fn next_view(&self) -> (Route, Option<TransitionState>) {
        timeout(Duration::from_secs(5), async {
            loop {
                match self.to_ui.recv().await {
                    Ok(AppEvent::ShowView { route, state }) => return (route, state),
                    Ok(_) => continue,
                    Err(e) => panic!("Channel error: {}", e),
                }
            }
        })
        .await
        .expect("Timeout - no view shown")
    }

    async fn wait_for_status(&self, pred: impl Fn(&WorkflowSnapshot) -> bool) -> WorkflowSnapshot {
        timeout(Duration::from_secs(5), async {
            loop {
                match self.to_ui.recv().await {
                    Ok(AppEvent::StatusUpdate(snapshot)) if pred(&snapshot) => return snapshot,
                    Ok(_) => continue,
                    Err(e) => panic!("Channel error: {}", e),
                }
            }
        })
        .await
        .expect("Timeout - status never reached")
    }

    /// Collect every view shown within `window`
    async fn views_within(&self, window: Duration) -> Vec<Route> {
        let mut views = Vec::new();
        let _ = timeout(window, async {
            while let Ok(event) = self.to_ui.recv().await {
                if let AppEvent::ShowView { route, .. } = event {
                    views.push(route);
                }
            }
        })
        .await;
        views
    }
}

fn config_for(server: &MockDetectionServer) -> Config {
    Config {
        service: ServiceConfig::with_base_url(server.base_url()),
        camera: CameraConfig {
            width: 64,
            height: 36,
            ..CameraConfig::default()
        },
        ..Config::default()
    }
}

async fn open_detection_view(harness: &Harness) {
    assert_eq!(harness.next_view().await.0, Route::MoodSelection);
    harness
        .send(AppEvent::Navigate {
            route: Route::FaceDetection,
            state: None,
        })
        .await;
    assert_eq!(harness.next_view().await.0, Route::FaceDetection);
    harness
        .wait_for_status(|s| s.status == WorkflowStatus::CameraOn)
        .await;
}

#[tokio::test]
async fn test_manual_selection_bypasses_detection() {
    let server = MockDetectionServer::start().await.unwrap();
    let camera = TrackingDevice::new();
    let harness = Harness::start(config_for(&server), camera.clone());

    assert_eq!(harness.next_view().await.0, Route::MoodSelection);
    harness.send(AppEvent::SelectMood(Mood::Sad)).await;

    let (route, state) = harness.next_view().await;
    assert_eq!(route, Route::GeneratedPlaylist);
    assert_eq!(
        state,
        Some(TransitionState {
            mood: Some("sad".to_string()),
            confidence: None,
            source: Some("manual".to_string()),
        })
    );
    assert_eq!(camera.acquired(), 0);
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_detection_hands_result_to_playlist() {
    let server = MockDetectionServer::start().await.unwrap();
    server.respond("/health", MockResponse::json(200, json!({ "status": "ok" })));
    server.respond(
        "/detect",
        MockResponse::json(
            200,
            json!({ "detectedMood": "happy", "confidence": 0.87, "source": "model-x" }),
        ),
    );
    let camera = TrackingDevice::new();
    let harness = Harness::start(config_for(&server), camera.clone());

    open_detection_view(&harness).await;
    harness.send(AppEvent::DetectMood).await;

    let (route, state) = harness.next_view().await;
    assert_eq!(route, Route::GeneratedPlaylist);
    let state = state.expect("playlist view without transition state");
    assert_eq!(state.mood.as_deref(), Some("happy"));
    assert_eq!(state.confidence, Some(0.87));
    assert_eq!(state.source.as_deref(), Some("model-x"));

    // Leaving the view released the camera
    assert_eq!(camera.acquired(), 1);
    assert!(camera.all_stopped());

    let detect = server
        .requests()
        .into_iter()
        .find(|r| r.path == "/detect")
        .unwrap();
    assert_eq!(detect.method, "POST");
    let body: serde_json::Value = serde_json::from_str(&detect.body).unwrap();
    assert!(
        body["imageBase64"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,")
    );
}

#[tokio::test]
async fn test_skip_returns_to_mood_selection() {
    let server = MockDetectionServer::start().await.unwrap();
    let camera = TrackingDevice::new();
    let harness = Harness::start(config_for(&server), camera.clone());

    open_detection_view(&harness).await;
    harness.send(AppEvent::SkipDetection).await;

    assert_eq!(harness.next_view().await.0, Route::MoodSelection);
    assert!(camera.all_stopped());
    assert_eq!(server.request_count("/detect"), 0);
}

#[tokio::test]
async fn test_leaving_mid_request_does_not_navigate() {
    let server = MockDetectionServer::start().await.unwrap();
    server.respond(
        "/detect",
        MockResponse::json(200, json!({ "detectedMood": "sad", "source": "model-x" }))
            .with_delay(Duration::from_millis(300)),
    );
    let camera = TrackingDevice::new();
    let harness = Harness::start(config_for(&server), camera.clone());

    open_detection_view(&harness).await;
    harness.send(AppEvent::DetectMood).await;

    timeout(Duration::from_secs(2), async {
        while server.request_count("/detect") == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Timeout - request never reached the service");

    harness
        .send(AppEvent::Navigate {
            route: Route::MoodSelection,
            state: None,
        })
        .await;
    assert_eq!(harness.next_view().await.0, Route::MoodSelection);
    assert!(camera.all_stopped());

    // The request finishes after the view is gone
    let views = harness.views_within(Duration::from_millis(700)).await;
    assert!(views.is_empty(), "unexpected navigation: {views:?}");
}

#[tokio::test]
async fn test_duplicate_detect_sends_one_request() {
    let server = MockDetectionServer::start().await.unwrap();
    server.respond(
        "/detect",
        MockResponse::json(200, json!({ "detectedMood": "angry", "confidence": 0.5 }))
            .with_delay(Duration::from_millis(300)),
    );
    let camera = TrackingDevice::new();
    let harness = Harness::start(config_for(&server), camera.clone());

    open_detection_view(&harness).await;
    harness.send(AppEvent::DetectMood).await;
    harness.send(AppEvent::DetectMood).await;

    let (route, state) = harness.next_view().await;
    assert_eq!(route, Route::GeneratedPlaylist);
    assert_eq!(state.unwrap().source.as_deref(), Some("unknown"));
    assert_eq!(server.request_count("/detect"), 1);
}

#[tokio::test]
async fn test_service_error_keeps_detection_view() {
    let server = MockDetectionServer::start().await.unwrap();
    server.respond(
        "/detect",
        MockResponse::json(200, json!({ "error": "no face found" })),
    );
    let camera = TrackingDevice::new();
    let harness = Harness::start(config_for(&server), camera.clone());

    open_detection_view(&harness).await;
    harness.send(AppEvent::DetectMood).await;

    let snapshot = harness
        .wait_for_status(|s| s.error.is_some() && !s.loading)
        .await;
    assert_eq!(snapshot.status, WorkflowStatus::Error);
    assert_eq!(snapshot.error.as_deref(), Some("no face found"));
    assert!(!camera.all_stopped());

    harness.send(AppEvent::DismissError).await;
    harness
        .wait_for_status(|s| s.error.is_none() && s.status == WorkflowStatus::Error)
        .await;
}

#[tokio::test]
async fn test_quit_tears_down_view() {
    let server = MockDetectionServer::start().await.unwrap();
    let camera = TrackingDevice::new();
    let harness = Harness::start(config_for(&server), camera.clone());

    open_detection_view(&harness).await;
    harness.send(AppEvent::Quit).await;

    let result = timeout(Duration::from_secs(2), harness.task)
        .await
        .expect("Timeout - event loop did not stop");
    result.unwrap().unwrap();
    assert!(harness.cancel.is_cancelled());
    assert!(camera.all_stopped());
}

#[tokio::test]
async fn test_cancel_stops_event_loop() {
    let server = MockDetectionServer::start().await.unwrap();
    let camera = TrackingDevice::new();
    let harness = Harness::start(config_for(&server), camera.clone());

    open_detection_view(&harness).await;
    harness.cancel.cancel();

    let result = timeout(Duration::from_secs(2), harness.task)
        .await
        .expect("Timeout - event loop did not stop");
    result.unwrap().unwrap();
    assert!(camera.all_stopped());
}
