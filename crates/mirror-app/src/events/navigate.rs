use std::sync::Arc;

use mirror_types::{AppEvent, Route, TransitionState};

use super::face_detection::mount_face_detection;
use super::{EventSinks, ViewHost};
use crate::state::AppState;

/// Switch views. Leaving the detection view unmounts it; entering it mounts a
/// fresh one, so navigating to it again acts as a reload.
pub async fn handle_navigation(
    state: &Arc<AppState>,
    host: &mut ViewHost,
    sinks: &EventSinks,
    route: Route,
    transition: Option<TransitionState>,
) -> anyhow::Result<()> {
    tracing::info!("Navigating {} -> {}", host.route, route);

    host.teardown().await;
    host.route = route;

    sinks
        .app_to_ui
        .send(AppEvent::ShowView {
            route,
            state: transition,
        })
        .await?;

    if route == Route::FaceDetection {
        let mounted = mount_face_detection(state, sinks).await?;
        host.detection = Some(mounted);
    }

    Ok(())
}
