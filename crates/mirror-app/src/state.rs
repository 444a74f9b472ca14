use std::sync::Arc;

use mirror_camera::CameraDevice;
use mirror_config::Config;
use tokio::sync::RwLock;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    /// Shared by every mount of the face detection view
    pub camera: Arc<dyn CameraDevice>,
}

impl AppState {
    pub fn new(config: Config, camera: Arc<dyn CameraDevice>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            camera,
        }
    }
}
