use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use mirror_config::Config;
use mirror_types::AppEvent;
use tokio::sync::RwLock;

pub async fn ui_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    ui_to_app_tx: AsyncSender<AppEvent>,
    config: Arc<RwLock<Config>>,
) -> anyhow::Result<()> {
    let config = Arc::new(config.read().await.clone());
    mirror_ui::ui_loop(config, app_to_ui_rx, ui_to_app_tx).await
}
