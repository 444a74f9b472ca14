use serde::{Deserialize, Serialize};

fn default_width() -> u32 {
    960
}

fn default_height() -> u32 {
    540
}

fn default_jpeg_quality() -> u8 {
    90
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CameraConfig {
    /// Requested capture width, also the fallback raster width
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// JPEG quality, 1-100
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    #[serde(default)]
    pub device_index: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            jpeg_quality: default_jpeg_quality(),
            device_index: 0,
        }
    }
}
