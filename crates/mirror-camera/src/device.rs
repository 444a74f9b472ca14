use std::sync::Arc;

use async_trait::async_trait;
use image::RgbImage;

/// Capture request passed to a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub width: u32,
    pub height: u32,
    pub audio: bool,
}

impl StreamConstraints {
    /// Video-only capture at the given resolution
    pub fn video(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            audio: false,
        }
    }
}

/// A single video track of an acquired stream
pub trait MediaTrack: Send + Sync {
    fn label(&self) -> &str;

    /// Size of produced frames, `None` until the track has delivered one
    fn intrinsic_size(&self) -> Option<(u32, u32)>;

    /// Latest frame, `None` if nothing is available yet or the track stopped
    fn read_frame(&self) -> Option<RgbImage>;

    /// Halt the track. Must be safe to call more than once.
    fn stop(&self);

    fn is_live(&self) -> bool;
}

/// Owned handle to an active camera stream.
///
/// Dropping the handle stops every track, so the hardware is released even on
/// early return.
pub struct MediaStreamHandle {
    tracks: Vec<Arc<dyn MediaTrack>>,
}

impl MediaStreamHandle {
    pub fn new(tracks: Vec<Arc<dyn MediaTrack>>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn video_track(&self) -> Option<Arc<dyn MediaTrack>> {
        self.tracks.first().cloned()
    }

    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(|t| t.is_live())
    }

    /// Stop every track and release the handle
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for MediaStreamHandle {
    fn drop(&mut self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

impl std::fmt::Debug for MediaStreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStreamHandle")
            .field(
                "tracks",
                &self.tracks.iter().map(|t| t.label()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Something that can hand out camera streams
#[async_trait]
pub trait CameraDevice: Send + Sync {
    fn name(&self) -> &str;

    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<MediaStreamHandle, CameraError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No camera device available: {0}")]
    DeviceUnavailable(String),

    #[error("Unsupported constraints: {0}")]
    UnsupportedConstraints(String),

    #[error("Camera backend error: {0}")]
    Backend(String),
}

impl CameraError {
    /// Fixed instructional text for the error panel
    pub fn user_message(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied => "Camera blocked. Allow camera permission and reload.",
            CameraError::DeviceUnavailable(_) | CameraError::UnsupportedConstraints(_) => {
                "No camera available. Connect a camera and reload."
            }
            CameraError::Backend(_) => "Camera failed to start. Reload to try again.",
        }
    }
}
