use std::env;

use serde::{Deserialize, Serialize};

use self::camera::CameraConfig;
use self::routes::RoutesConfig;
use self::service::ServiceConfig;
use self::ui::UiConfig;

pub mod camera;
pub mod routes;
pub mod service;
pub mod ui;

fn default_app_channel_capacity() -> usize {
    64
}

fn default_ui_channel_capacity() -> usize {
    128
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub camera: CameraConfig,
    pub ui: UiConfig,
    pub routes: RoutesConfig,

    /// Capacity of the channel feeding the app event loop
    #[serde(default = "default_app_channel_capacity")]
    pub app_channel_capacity: usize,
    /// Capacity of the channel feeding the UI
    #[serde(default = "default_ui_channel_capacity")]
    pub ui_channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            camera: CameraConfig::default(),
            ui: UiConfig::default(),
            routes: RoutesConfig::default(),
            app_channel_capacity: default_app_channel_capacity(),
            ui_channel_capacity: default_ui_channel_capacity(),
        }
    }
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn new() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        if let Ok(url) = env::var("MOOD_SERVICE_URL")
            && !url.trim().is_empty()
        {
            self.service.base_url = url.trim().to_string();
        }

        if let Some(index) = env::var("CAMERA_INDEX").ok().and_then(|v| v.parse().ok()) {
            self.camera.device_index = index;
        }

        if let Ok(name) = env::var("MOOD_DISPLAY_NAME")
            && !name.trim().is_empty()
        {
            self.ui.display_name = name.trim().to_string();
        }
    }
}
