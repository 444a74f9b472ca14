use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::controller::PreviewSurface;

pub const JPEG_MIME: &str = "image/jpeg";

/// One encoded still, discarded once the detection request completes
#[derive(Clone)]
pub struct CapturedFrame {
    mime: &'static str,
    quality: u8,
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl CapturedFrame {
    pub fn mime(&self) -> &str {
        self.mime
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `data:image/jpeg;base64,...`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

impl std::fmt::Debug for CapturedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("mime", &self.mime)
            .field("quality", &self.quality)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Snapshots the preview into a JPEG
#[derive(Debug, Clone, Copy)]
pub struct FrameCapture {
    fallback_width: u32,
    fallback_height: u32,
    quality: u8,
}

impl FrameCapture {
    pub fn new(fallback_width: u32, fallback_height: u32, quality: u8) -> Self {
        Self {
            fallback_width: fallback_width.max(1),
            fallback_height: fallback_height.max(1),
            quality: quality.clamp(1, 100),
        }
    }

    /// `None` when there is no playing surface or no frame to render
    pub fn capture_frame(&self, surface: &PreviewSurface) -> Option<CapturedFrame> {
        if !surface.is_playing() {
            tracing::debug!("[CAPTURE] Preview not playing");
            return None;
        }

        let (width, height) = surface
            .intrinsic_size()
            .filter(|(w, h)| *w > 0 && *h > 0)
            .unwrap_or((self.fallback_width, self.fallback_height));

        let frame = surface.read_frame()?;
        let raster = if frame.dimensions() == (width, height) {
            frame
        } else {
            imageops::resize(&frame, width, height, FilterType::Triangle)
        };

        match encode_jpeg(&raster, self.quality) {
            Ok(bytes) => {
                tracing::debug!("[CAPTURE] {}x{} -> {} bytes", width, height, bytes.len());
                Some(CapturedFrame {
                    mime: JPEG_MIME,
                    quality: self.quality,
                    width,
                    height,
                    bytes,
                })
            }
            Err(e) => {
                tracing::warn!("[CAPTURE] JPEG encoding failed: {}", e);
                None
            }
        }
    }
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::controller::CameraController;
    use crate::device::{
        CameraDevice, CameraError, MediaStreamHandle, MediaTrack, StreamConstraints,
    };
    use crate::still::StillImageDevice;

    /// Track that has frames but has not reported its size yet
    struct WarmingTrack {
        live: AtomicBool,
        has_frame: bool,
    }

    impl MediaTrack for WarmingTrack {
        fn label(&self) -> &str {
            "warming"
        }

        fn intrinsic_size(&self) -> Option<(u32, u32)> {
            None
        }

        fn read_frame(&self) -> Option<RgbImage> {
            self.has_frame.then(|| RgbImage::new(10, 10))
        }

        fn stop(&self) {
            self.live.store(false, Ordering::SeqCst);
        }

        fn is_live(&self) -> bool {
            self.live.load(Ordering::SeqCst)
        }
    }

    struct WarmingDevice {
        has_frame: bool,
    }

    #[async_trait]
    impl CameraDevice for WarmingDevice {
        fn name(&self) -> &str {
            "warming"
        }

        async fn acquire(
            &self,
            _constraints: &StreamConstraints,
        ) -> Result<MediaStreamHandle, CameraError> {
            Ok(MediaStreamHandle::new(vec![Arc::new(WarmingTrack {
                live: AtomicBool::new(true),
                has_frame: self.has_frame,
            })]))
        }
    }

    #[test]
    fn test_detached_surface_gives_none() {
        let capture = FrameCapture::new(960, 540, 90);
        assert!(capture.capture_frame(&PreviewSurface::detached()).is_none());
    }

    #[tokio::test]
    async fn test_capture_uses_intrinsic_size() {
        let device = StillImageDevice::test_pattern(40, 30);
        let mut camera = CameraController::new(Arc::new(device), StreamConstraints::video(960, 540));
        camera.start().await;

        let frame = FrameCapture::new(960, 540, 90)
            .capture_frame(camera.preview())
            .unwrap();

        assert_eq!(frame.dimensions(), (40, 30));
        assert_eq!(frame.mime(), "image/jpeg");
        assert_eq!(frame.quality(), 90);
        // JPEG SOI marker
        assert_eq!(&frame.bytes()[..2], &[0xFF, 0xD8]);
        assert!(frame.to_data_uri().starts_with("data:image/jpeg;base64,/9j/"));
    }

    #[tokio::test]
    async fn test_capture_falls_back_to_configured_size() {
        let mut camera = CameraController::new(
            Arc::new(WarmingDevice { has_frame: true }),
            StreamConstraints::video(96, 54),
        );
        camera.start().await;

        let frame = FrameCapture::new(96, 54, 90)
            .capture_frame(camera.preview())
            .unwrap();
        assert_eq!(frame.dimensions(), (96, 54));
    }

    #[tokio::test]
    async fn test_capture_without_frame_gives_none() {
        let mut camera = CameraController::new(
            Arc::new(WarmingDevice { has_frame: false }),
            StreamConstraints::video(96, 54),
        );
        camera.start().await;

        assert!(FrameCapture::new(96, 54, 90).capture_frame(camera.preview()).is_none());
    }

    #[tokio::test]
    async fn test_capture_after_stop_gives_none() {
        let device = StillImageDevice::test_pattern(8, 8);
        let mut camera = CameraController::new(Arc::new(device), StreamConstraints::video(8, 8));
        camera.start().await;
        camera.stop();

        assert!(FrameCapture::new(8, 8, 90).capture_frame(camera.preview()).is_none());
    }

    #[tokio::test]
    async fn test_capture_is_repeatable() {
        let device = StillImageDevice::test_pattern(16, 16);
        let mut camera = CameraController::new(Arc::new(device), StreamConstraints::video(16, 16));
        camera.start().await;
        let capture = FrameCapture::new(16, 16, 90);

        let first = capture.capture_frame(camera.preview()).unwrap();
        let second = capture.capture_frame(camera.preview()).unwrap();
        assert_eq!(first.bytes(), second.bytes());
        assert!(camera.preview().is_playing());
    }
}
