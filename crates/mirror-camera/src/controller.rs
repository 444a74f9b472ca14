use std::sync::Arc;

use image::RgbImage;

use crate::device::{CameraDevice, CameraError, MediaStreamHandle, MediaTrack, StreamConstraints};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CameraState {
    #[default]
    Idle,
    Starting,
    On,
    Error,
}

/// The live preview a stream is bound to. Frame capture reads from here.
#[derive(Default)]
pub struct PreviewSurface {
    track: Option<Arc<dyn MediaTrack>>,
    playing: bool,
}

impl PreviewSurface {
    pub fn detached() -> Self {
        Self::default()
    }

    fn bind(&mut self, track: Arc<dyn MediaTrack>) {
        self.track = Some(track);
        self.playing = false;
    }

    fn play(&mut self) -> Result<(), CameraError> {
        match &self.track {
            Some(track) if track.is_live() => {
                self.playing = true;
                Ok(())
            }
            Some(track) => Err(CameraError::Backend(format!(
                "track '{}' ended before playback",
                track.label()
            ))),
            None => Err(CameraError::DeviceUnavailable(
                "no video track bound".to_string(),
            )),
        }
    }

    fn clear(&mut self) {
        self.track = None;
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing && self.track.as_ref().is_some_and(|t| t.is_live())
    }

    pub fn intrinsic_size(&self) -> Option<(u32, u32)> {
        self.track.as_ref().and_then(|t| t.intrinsic_size())
    }

    pub fn read_frame(&self) -> Option<RgbImage> {
        self.track.as_ref().and_then(|t| t.read_frame())
    }
}

/// Owns the camera stream for one view instance.
///
/// `idle -> starting -> {on | error}`, `on -> idle` on stop. Failures are
/// reported through [`CameraController::state`] and [`CameraController::error`],
/// never returned.
pub struct CameraController {
    device: Arc<dyn CameraDevice>,
    constraints: StreamConstraints,
    stream: Option<MediaStreamHandle>,
    preview: PreviewSurface,
    state: CameraState,
    error: Option<CameraError>,
}

impl CameraController {
    pub fn new(device: Arc<dyn CameraDevice>, constraints: StreamConstraints) -> Self {
        Self {
            device,
            constraints,
            stream: None,
            preview: PreviewSurface::detached(),
            state: CameraState::Idle,
            error: None,
        }
    }

    /// Acquire the stream, bind it to the preview and start playback
    pub async fn start(&mut self) -> CameraState {
        if self.stream.is_some() {
            tracing::debug!("[CAMERA] start() with an active stream, ignoring");
            return self.state;
        }

        self.state = CameraState::Starting;
        self.error = None;
        tracing::info!(
            "[CAMERA] Requesting {}x{} video from '{}'",
            self.constraints.width,
            self.constraints.height,
            self.device.name()
        );

        let stream = match self.device.acquire(&self.constraints).await {
            Ok(stream) => stream,
            Err(e) => {
                self.fail(e);
                return self.state;
            }
        };

        let Some(track) = stream.video_track() else {
            self.fail(CameraError::DeviceUnavailable(
                "stream has no video track".to_string(),
            ));
            return self.state;
        };

        self.preview.bind(track);
        if let Err(e) = self.preview.play() {
            self.preview.clear();
            self.fail(e);
            return self.state;
        }

        tracing::info!("[CAMERA] Camera on: {:?}", stream);
        self.stream = Some(stream);
        self.state = CameraState::On;
        self.state
    }

    /// Release the stream. No-op without one.
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.preview.clear();
            stream.stop();
            self.state = CameraState::Idle;
            tracing::info!("[CAMERA] Camera stopped");
        }
    }

    fn fail(&mut self, error: CameraError) {
        tracing::warn!("[CAMERA] Failed to start: {}", error);
        self.state = CameraState::Error;
        self.error = Some(error);
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn error(&self) -> Option<&CameraError> {
        self.error.as_ref()
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    pub fn preview(&self) -> &PreviewSurface {
        &self.preview
    }
}

impl Drop for CameraController {
    fn drop(&mut self) {
        self.stop();
    }
}
