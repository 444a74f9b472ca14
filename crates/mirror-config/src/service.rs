use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_detect_path() -> String {
    "/detect".to_string()
}

/// Detection service endpoint
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base address, 127.0.0.1 rather than localhost to avoid IPv6 resolution surprises
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_health_path")]
    pub health_path: String,
    #[serde(default = "default_detect_path")]
    pub detect_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            health_path: default_health_path(),
            detect_path: default_detect_path(),
        }
    }
}

impl ServiceConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn health_url(&self) -> String {
        join(self.base(), &self.health_path)
    }

    pub fn detect_url(&self) -> String {
        join(self.base(), &self.detect_path)
    }
}

fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base, path.trim_start_matches('/'))
}
