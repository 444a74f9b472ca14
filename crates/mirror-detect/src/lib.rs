mod client;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use client::HttpDetectionClient;

use mirror_types::DetectionResult;

/// Contract of the external mood detection service
#[async_trait::async_trait]
pub trait DetectionService: Send + Sync {
    /// Base address, used in user-facing hints
    fn base_url(&self) -> &str;

    /// Lightweight reachability check
    async fn check_health(&self) -> Result<(), DetectError>;

    /// Submit an encoded frame (`data:` URI) and interpret the reply
    async fn detect(&self, image_base64: &str) -> Result<DetectionResult, DetectError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Health check failed: HTTP {0}")]
    Unhealthy(u16),

    /// Non-success status or an explicit `error` field, message passed through
    #[error("{0}")]
    Service(String),

    /// Success status but the body breaks the contract
    #[error("{0}")]
    Malformed(String),
}
