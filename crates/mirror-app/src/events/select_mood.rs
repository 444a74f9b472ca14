use std::sync::Arc;

use mirror_core::navigation::{manual_selection, manual_skip};
use mirror_types::{AppEvent, Mood};

use super::navigate::handle_navigation;
use super::{EventSinks, ViewHost};
use crate::state::AppState;

pub async fn handle_mood_selection(
    state: &Arc<AppState>,
    host: &mut ViewHost,
    sinks: &EventSinks,
    mood: Mood,
) -> anyhow::Result<()> {
    let (result, event) = manual_selection(mood);
    tracing::info!("Mood picked manually: {}", result.mood());
    follow(state, host, sinks, event).await
}

pub async fn handle_manual_skip(
    state: &Arc<AppState>,
    host: &mut ViewHost,
    sinks: &EventSinks,
) -> anyhow::Result<()> {
    let event = {
        let config = state.config.read().await;
        manual_skip(&config.routes)
    };
    tracing::info!("Detection skipped");
    follow(state, host, sinks, event).await
}

async fn follow(
    state: &Arc<AppState>,
    host: &mut ViewHost,
    sinks: &EventSinks,
    event: AppEvent,
) -> anyhow::Result<()> {
    match event {
        AppEvent::Navigate { route, state: transition } => {
            handle_navigation(state, host, sinks, route, transition).await
        }
        other => {
            tracing::warn!("Expected a navigation, got {:?}", other);
            Ok(())
        }
    }
}
