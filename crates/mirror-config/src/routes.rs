use mirror_types::Route;
use serde::{Deserialize, Serialize};

fn default_manual_skip() -> String {
    "/".to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct RoutesConfig {
    /// Where "skip & choose manually" leads from the detection view
    #[serde(default = "default_manual_skip")]
    pub manual_skip: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            manual_skip: default_manual_skip(),
        }
    }
}

impl RoutesConfig {
    pub fn manual_skip_route(&self) -> Route {
        Route::resolve(&self.manual_skip)
    }
}
