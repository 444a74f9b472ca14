use serde::{Deserialize, Serialize};

fn default_display_name() -> String {
    "User".to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct UiConfig {
    /// Name shown in the greeting
    #[serde(default = "default_display_name")]
    pub display_name: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
        }
    }
}

impl UiConfig {
    pub fn initial(&self) -> char {
        self.display_name
            .trim()
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('U')
    }
}
