use std::ops::ControlFlow;
use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use mirror_types::{AppEvent, Route};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub mod detect_mood;
pub mod face_detection;
pub mod navigate;
pub mod select_mood;

use detect_mood::handle_detect_mood;
use face_detection::MountedDetection;
use navigate::handle_navigation;
use select_mood::{handle_manual_skip, handle_mood_selection};

/// Which view is on screen, plus the live detection view if that is the one
pub struct ViewHost {
    pub route: Route,
    pub detection: Option<MountedDetection>,
}

impl ViewHost {
    pub fn new() -> Self {
        Self {
            route: Route::MoodSelection,
            detection: None,
        }
    }

    /// Unmount whatever needs unmounting
    pub async fn teardown(&mut self) {
        if let Some(detection) = self.detection.take() {
            detection.unmount().await;
        }
    }
}

impl Default for ViewHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Senders the handlers need
#[derive(Clone)]
pub struct EventSinks {
    /// Back into this loop, used by workflows to request navigation
    pub app_inbox: AsyncSender<AppEvent>,
    pub app_to_ui: AsyncSender<AppEvent>,
}

/// App's main loop
pub async fn event_loop(
    state: Arc<AppState>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    sinks: EventSinks,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut host = ViewHost::new();

    handle_navigation(&state, &mut host, &sinks, Route::MoodSelection, None).await?;
    sinks.app_to_ui.send(AppEvent::BackendReady).await?;

    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    let result = loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("[EVENT_LOOP] Cancelled");
                break Ok(());
            }
            event = ui_to_app_rx.recv() => match event {
                Ok(event) => event,
                Err(e) => break Err(e.into()),
            },
        };

        tracing::debug!(
            "[EVENT_LOOP] Event received: {:?}",
            std::mem::discriminant(&event)
        );
        match handle_events(&state, &mut host, &sinks, event).await {
            Ok(ControlFlow::Continue(())) => {}
            Ok(ControlFlow::Break(())) => {
                cancel.cancel();
                break Ok(());
            }
            Err(e) => break Err(e),
        }
    };

    host.teardown().await;
    let _ = sinks.app_to_ui.send(AppEvent::Quit).await;
    result
}

async fn handle_events(
    state: &Arc<AppState>,
    host: &mut ViewHost,
    sinks: &EventSinks,
    event: AppEvent,
) -> anyhow::Result<ControlFlow<()>> {
    match event {
        AppEvent::Navigate { route, state: transition } => {
            handle_navigation(state, host, sinks, route, transition).await?;
        }
        AppEvent::SelectMood(mood) => {
            handle_mood_selection(state, host, sinks, mood).await?;
        }
        AppEvent::SkipDetection => {
            handle_manual_skip(state, host, sinks).await?;
        }
        AppEvent::DetectMood => {
            handle_detect_mood(host);
        }
        AppEvent::DismissError => {
            if let Some(detection) = &host.detection {
                detection.workflow.dismiss_error().await;
            }
        }
        AppEvent::StatusUpdate(_) | AppEvent::ShowView { .. } | AppEvent::BackendReady => {
            // UI-only events, ignore in backend
        }
        AppEvent::Quit => {
            tracing::info!("[EVENT_LOOP] Quit requested");
            return Ok(ControlFlow::Break(()));
        }
    }

    Ok(ControlFlow::Continue(()))
}
