use mirror_camera::CameraError;
use mirror_detect::DetectError;

/// Everything that can end a detection attempt or keep the camera from starting
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error("No camera frame available")]
    CaptureUnavailable,

    /// Empty when the service could not be reached at all
    #[error("{0}")]
    Service(String),

    #[error("{0}")]
    MalformedResponse(String),
}

impl From<DetectError> for WorkflowError {
    fn from(error: DetectError) -> Self {
        match error {
            DetectError::Network(e) => {
                tracing::warn!("Detection request failed: {}", e);
                WorkflowError::Service(String::new())
            }
            DetectError::Unhealthy(status) => WorkflowError::Service(format!("HTTP {status}")),
            DetectError::Service(message) => WorkflowError::Service(message),
            DetectError::Malformed(message) => WorkflowError::MalformedResponse(message),
        }
    }
}

impl WorkflowError {
    /// Text for the error panel
    pub fn user_message(&self, base_url: &str) -> String {
        match self {
            WorkflowError::Camera(e) => e.user_message().to_string(),
            WorkflowError::Service(message) if message.trim().is_empty() => format!(
                "Failed to fetch. Make sure the detection service is running at {base_url}"
            ),
            other => other.to_string(),
        }
    }
}
