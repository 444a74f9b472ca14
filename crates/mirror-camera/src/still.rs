use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use image::{Rgb, RgbImage};

use crate::device::{
    CameraDevice, CameraError, MediaStreamHandle, MediaTrack, StreamConstraints,
};

/// Camera that plays back a fixed raster, e.g. a photo loaded from disk
#[derive(Clone)]
pub struct StillImageDevice {
    name: String,
    image: Arc<RgbImage>,
}

impl StillImageDevice {
    pub fn from_image(image: RgbImage) -> Self {
        Self {
            name: "still-image".to_string(),
            image: Arc::new(image),
        }
    }

    /// Load any format the `image` crate can decode
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CameraError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| CameraError::DeviceUnavailable(format!("{}: {}", path.display(), e)))?
            .to_rgb8();

        tracing::info!(
            "Loaded still image {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );

        Ok(Self {
            name: path.display().to_string(),
            image: Arc::new(image),
        })
    }

    /// Gradient pattern at the requested size
    pub fn test_pattern(width: u32, height: u32) -> Self {
        let image = RgbImage::from_fn(width.max(1), height.max(1), |x, y| {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            Rgb([r, g, 128])
        });

        Self {
            name: "test-pattern".to_string(),
            image: Arc::new(image),
        }
    }
}

#[async_trait]
impl CameraDevice for StillImageDevice {
    fn name(&self) -> &str {
        &self.name
    }

    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<MediaStreamHandle, CameraError> {
        if constraints.audio {
            return Err(CameraError::UnsupportedConstraints(
                "still image has no audio".to_string(),
            ));
        }

        let track = StillTrack {
            label: format!("{} video", self.name),
            image: self.image.clone(),
            live: AtomicBool::new(true),
        };

        Ok(MediaStreamHandle::new(vec![Arc::new(track)]))
    }
}

struct StillTrack {
    label: String,
    image: Arc<RgbImage>,
    live: AtomicBool,
}

impl MediaTrack for StillTrack {
    fn label(&self) -> &str {
        &self.label
    }

    fn intrinsic_size(&self) -> Option<(u32, u32)> {
        self.is_live().then(|| self.image.dimensions())
    }

    fn read_frame(&self) -> Option<RgbImage> {
        self.is_live().then(|| (*self.image).clone())
    }

    fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}
