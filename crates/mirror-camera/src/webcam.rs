use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use async_trait::async_trait;
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::{Camera, NokhwaError};
use tokio::sync::oneshot;

use crate::device::{
    CameraDevice, CameraError, MediaStreamHandle, MediaTrack, StreamConstraints,
};

/// Give up on a stream after this many consecutive failed reads
const MAX_READ_FAILURES: u32 = 30;

/// Physical camera opened through nokhwa.
///
/// The camera lives on its own thread, which keeps the most recent decoded frame
/// for the track to hand out.
pub struct WebcamDevice {
    index: u32,
    name: String,
}

impl WebcamDevice {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            name: format!("webcam #{index}"),
        }
    }
}

#[async_trait]
impl CameraDevice for WebcamDevice {
    fn name(&self) -> &str {
        &self.name
    }

    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<MediaStreamHandle, CameraError> {
        if constraints.audio {
            return Err(CameraError::UnsupportedConstraints(
                "audio capture is not supported".to_string(),
            ));
        }

        let shared = Arc::new(Shared {
            latest: Mutex::new(None),
            live: AtomicBool::new(true),
        });
        let (ready_tx, ready_rx) = oneshot::channel();

        let index = self.index;
        let (width, height) = (constraints.width, constraints.height);
        let worker_shared = shared.clone();
        thread::Builder::new()
            .name(format!("webcam-{index}"))
            .spawn(move || capture_loop(index, width, height, worker_shared, ready_tx))
            .map_err(|e| CameraError::Backend(e.to_string()))?;

        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(CameraError::Backend("capture thread exited".to_string())),
        }

        let track = WebcamTrack {
            label: self.name.clone(),
            shared,
        };
        Ok(MediaStreamHandle::new(vec![Arc::new(track)]))
    }
}

struct Shared {
    latest: Mutex<Option<RgbImage>>,
    live: AtomicBool,
}

fn capture_loop(
    index: u32,
    width: u32,
    height: u32,
    shared: Arc<Shared>,
    ready_tx: oneshot::Sender<Result<(), CameraError>>,
) {
    let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
        CameraFormat::new(Resolution::new(width, height), FrameFormat::MJPEG, 30),
    ));

    let mut camera = match Camera::new(CameraIndex::Index(index), format)
        .and_then(|mut camera| camera.open_stream().map(|_| camera))
    {
        Ok(camera) => camera,
        Err(e) => {
            shared.live.store(false, Ordering::SeqCst);
            let _ = ready_tx.send(Err(map_error(e)));
            return;
        }
    };

    if ready_tx.send(Ok(())).is_err() {
        let _ = camera.stop_stream();
        return;
    }

    let mut failures = 0;
    while shared.live.load(Ordering::SeqCst) {
        let frame = camera
            .frame()
            .and_then(|buffer| buffer.decode_image::<RgbFormat>());

        match frame {
            Ok(decoded) => {
                failures = 0;
                let (w, h) = (decoded.width(), decoded.height());
                if let Some(image) = RgbImage::from_raw(w, h, decoded.into_raw())
                    && let Ok(mut latest) = shared.latest.lock()
                {
                    *latest = Some(image);
                }
            }
            Err(e) => {
                failures += 1;
                tracing::warn!("[WEBCAM] Frame read failed ({}): {}", failures, e);
                if failures >= MAX_READ_FAILURES {
                    tracing::error!("[WEBCAM] Too many read failures, ending stream");
                    shared.live.store(false, Ordering::SeqCst);
                }
            }
        }
    }

    if let Err(e) = camera.stop_stream() {
        tracing::warn!("[WEBCAM] stop_stream failed: {}", e);
    }
    tracing::debug!("[WEBCAM] Capture thread for #{} exiting", index);
}

fn map_error(error: NokhwaError) -> CameraError {
    let text = error.to_string();
    let lower = text.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") {
        CameraError::PermissionDenied
    } else if matches!(error, NokhwaError::OpenDeviceError(..)) {
        CameraError::DeviceUnavailable(text)
    } else {
        CameraError::Backend(text)
    }
}

struct WebcamTrack {
    label: String,
    shared: Arc<Shared>,
}

impl MediaTrack for WebcamTrack {
    fn label(&self) -> &str {
        &self.label
    }

    fn intrinsic_size(&self) -> Option<(u32, u32)> {
        let latest = self.shared.latest.lock().ok()?;
        latest.as_ref().map(|image| image.dimensions())
    }

    fn read_frame(&self) -> Option<RgbImage> {
        if !self.is_live() {
            return None;
        }
        self.shared.latest.lock().ok()?.clone()
    }

    fn stop(&self) {
        // The capture thread notices on its next iteration and drops the camera
        self.shared.live.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.shared.live.load(Ordering::SeqCst)
    }
}
