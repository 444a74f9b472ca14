use mirror_config::service::ServiceConfig;
use mirror_types::DetectionResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DetectError, DetectionService};

const REQUEST_FAILED: &str = "Request failed";
const NO_MOOD: &str = "No detectedMood returned";
/// Used when the service omits `source`
const UNKNOWN_SOURCE: &str = "unknown";

#[derive(Clone)]
pub struct HttpDetectionClient {
    config: ServiceConfig,
    client: reqwest::Client,
}

impl HttpDetectionClient {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl DetectionService for HttpDetectionClient {
    fn base_url(&self) -> &str {
        self.config.base()
    }

    async fn check_health(&self) -> Result<(), DetectError> {
        let response = self.client.get(self.config.health_url()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectError::Unhealthy(status.as_u16()));
        }

        Ok(())
    }

    async fn detect(&self, image_base64: &str) -> Result<DetectionResult, DetectError> {
        let request = DetectRequest { image_base64 };

        let response = self
            .client
            .post(self.config.detect_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("Detection service returned HTTP {}", status);
            let message = if text.trim().is_empty() {
                REQUEST_FAILED.to_string()
            } else {
                text
            };
            return Err(DetectError::Service(message));
        }

        let body: DetectResponse = response.json().await.map_err(|e| {
            DetectError::Malformed(format!("Failed to parse detection response: {}", e))
        })?;

        body.into_result()
    }
}

#[derive(Serialize)]
struct DetectRequest<'a> {
    #[serde(rename = "imageBase64")]
    image_base64: &'a str,
}

/// Loosely typed so that contract violations surface as [`DetectError::Malformed`]
#[derive(Deserialize)]
struct DetectResponse {
    #[serde(rename = "detectedMood", default)]
    detected_mood: Option<Value>,
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default)]
    source: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl DetectResponse {
    fn into_result(self) -> Result<DetectionResult, DetectError> {
        if let Some(message) = self.error.as_ref().and_then(signalled_text) {
            return Err(DetectError::Service(message));
        }

        // Blank moods still fail DetectionResult::new
        let mood = self
            .detected_mood
            .as_ref()
            .and_then(signalled_text)
            .unwrap_or_default();
        let confidence = self.confidence.as_ref().and_then(Value::as_f64);
        let source = self
            .source
            .as_ref()
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SOURCE);

        DetectionResult::new(mood, confidence, source)
            .ok_or_else(|| DetectError::Malformed(NO_MOOD.to_string()))
    }
}

/// Text of a set field. Unset values (null, false, zero, empty string) give `None`,
/// strings are taken as-is and anything else is rendered as JSON.
fn signalled_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::{MockDetectionServer, MockResponse};

    fn parse(body: Value) -> Result<DetectionResult, DetectError> {
        serde_json::from_value::<DetectResponse>(body)
            .unwrap()
            .into_result()
    }

    #[test]
    fn test_full_response() {
        let result =
            parse(json!({ "detectedMood": "happy", "confidence": 0.87, "source": "model-x" }))
                .unwrap();
        assert_eq!(result.mood(), "happy");
        assert_eq!(result.confidence(), Some(0.87));
        assert_eq!(result.source(), "model-x");
    }

    #[test]
    fn test_error_field_wins() {
        let err = parse(json!({ "error": "no face found", "detectedMood": "happy" })).unwrap_err();
        assert!(matches!(err, DetectError::Service(ref m) if m == "no face found"));
    }

    #[test]
    fn test_falsy_error_field_ignored() {
        for error in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            let result = parse(json!({ "error": error, "detectedMood": "sad" })).unwrap();
            assert_eq!(result.mood(), "sad");
        }
    }

    #[test]
    fn test_non_string_error_is_rendered() {
        let err = parse(json!({ "error": 42 })).unwrap_err();
        assert!(matches!(err, DetectError::Service(ref m) if m == "42"));

        let err = parse(json!({ "error": true, "detectedMood": "happy" })).unwrap_err();
        assert!(matches!(err, DetectError::Service(ref m) if m == "true"));
    }

    #[test]
    fn test_non_string_mood_is_rendered() {
        let result = parse(json!({ "detectedMood": 7 })).unwrap();
        assert_eq!(result.mood(), "7");

        let err = parse(json!({ "detectedMood": 0 })).unwrap_err();
        assert!(matches!(err, DetectError::Malformed(_)));
    }

    #[test]
    fn test_missing_mood_is_malformed() {
        let err = parse(json!({ "confidence": 0.5 })).unwrap_err();
        assert!(matches!(err, DetectError::Malformed(ref m) if m == "No detectedMood returned"));

        let err = parse(json!({ "detectedMood": "" })).unwrap_err();
        assert!(matches!(err, DetectError::Malformed(_)));

        let err = parse(json!({ "detectedMood": "   " })).unwrap_err();
        assert!(matches!(err, DetectError::Malformed(_)));
    }

    #[test]
    fn test_optional_fields() {
        let result = parse(json!({ "detectedMood": "neutral" })).unwrap();
        assert_eq!(result.confidence(), None);
        assert_eq!(result.source(), "unknown");
    }

    #[test]
    fn test_request_wire_format() {
        let body = serde_json::to_value(DetectRequest {
            image_base64: "data:image/jpeg;base64,AAAA",
        })
        .unwrap();
        assert_eq!(body, json!({ "imageBase64": "data:image/jpeg;base64,AAAA" }));
    }

    #[tokio::test]
    async fn test_detect_against_mock_server() {
        let server = MockDetectionServer::start().await.unwrap();
        server.respond(
            "/detect",
            MockResponse::json(
                200,
                json!({ "detectedMood": "surprised", "confidence": 0.5, "source": "deepface" }),
            ),
        );

        let client = HttpDetectionClient::new(ServiceConfig::with_base_url(server.base_url()));
        let result = client.detect("data:image/jpeg;base64,AAAA").await.unwrap();

        assert_eq!(result.mood(), "surprised");
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/detect");
        let sent: Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(sent, json!({ "imageBase64": "data:image/jpeg;base64,AAAA" }));
    }

    #[tokio::test]
    async fn test_non_success_uses_body_text() {
        let server = MockDetectionServer::start().await.unwrap();
        server.respond("/detect", MockResponse::text(500, "model crashed"));

        let client = HttpDetectionClient::new(ServiceConfig::with_base_url(server.base_url()));
        let err = client.detect("data:,").await.unwrap_err();
        assert!(matches!(err, DetectError::Service(ref m) if m == "model crashed"));
    }

    #[tokio::test]
    async fn test_non_success_empty_body() {
        let server = MockDetectionServer::start().await.unwrap();
        server.respond("/detect", MockResponse::text(503, ""));

        let client = HttpDetectionClient::new(ServiceConfig::with_base_url(server.base_url()));
        let err = client.detect("data:,").await.unwrap_err();
        assert!(matches!(err, DetectError::Service(ref m) if m == "Request failed"));
    }

    #[tokio::test]
    async fn test_success_with_invalid_json() {
        let server = MockDetectionServer::start().await.unwrap();
        server.respond("/detect", MockResponse::text(200, "<html>"));

        let client = HttpDetectionClient::new(ServiceConfig::with_base_url(server.base_url()));
        let err = client.detect("data:,").await.unwrap_err();
        assert!(matches!(err, DetectError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockDetectionServer::start().await.unwrap();
        server.respond(
            "/health",
            MockResponse::json(200, json!({ "status": "pyservice running" })),
        );
        let client = HttpDetectionClient::new(ServiceConfig::with_base_url(server.base_url()));
        assert!(client.check_health().await.is_ok());

        server.respond("/health", MockResponse::text(500, "down"));
        let err = client.check_health().await.unwrap_err();
        assert!(matches!(err, DetectError::Unhealthy(500)));
    }

    #[tokio::test]
    async fn test_health_unreachable() {
        let server = MockDetectionServer::start().await.unwrap();
        let base_url = server.base_url();
        drop(server);
        // Give the listener a moment to close
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let client = HttpDetectionClient::new(ServiceConfig::with_base_url(base_url));
        let err = client.check_health().await.unwrap_err();
        assert!(matches!(err, DetectError::Network(_)));
    }
}
