mod capture;
mod controller;
mod device;
mod still;
#[cfg(feature = "webcam")]
mod webcam;

pub use capture::{CapturedFrame, FrameCapture, JPEG_MIME, encode_jpeg};
pub use controller::{CameraController, CameraState, PreviewSurface};
pub use device::{
    CameraDevice, CameraError, MediaStreamHandle, MediaTrack, StreamConstraints,
};
pub use still::StillImageDevice;
#[cfg(feature = "webcam")]
pub use webcam::WebcamDevice;
