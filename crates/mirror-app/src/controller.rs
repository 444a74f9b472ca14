use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use mirror_config::Config;
use mirror_types::AppEvent;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::{EventSinks, event_loop};
use crate::state::AppState;
use crate::ui::ui_loop;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    /// Commands from the UI and navigation requests from mounted views
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new(config: &Config) -> Self {
        Self {
            app_to_ui: kanal::bounded_async(config.ui_channel_capacity),
            ui_to_app: kanal::bounded_async(config.app_channel_capacity),
        }
    }

    pub fn sinks(&self) -> EventSinks {
        EventSinks {
            app_inbox: self.ui_to_app.0.clone(),
            app_to_ui: self.app_to_ui.0.clone(),
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub async fn new(state: Arc<AppState>) -> Self {
        let channels = {
            let config = state.config.read().await;
            ChannelSet::new(&config)
        };

        Self {
            channels,
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Event loop
        tasks.spawn(event_loop(
            self.state.clone(),
            self.channels.ui_to_app.1.clone(),
            self.channels.sinks(),
            self.cancel_token.child_token(),
        ));

        // UI loop
        tasks.spawn(ui_loop(
            self.channels.app_to_ui.1.clone(),
            self.channels.ui_to_app.0.clone(),
            self.state.config.clone(),
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
