use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use mirror_config::Config;

/// Config shipped next to the binary's working directory
const DEFAULT_CONFIG_PATH: &str = "config.json";

fn load_config_file(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading config from {}", path.display());
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

/// Explicit path must load; otherwise `config.json` if present, else defaults.
/// Environment overrides apply last in every case.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_config_file(Path::new(DEFAULT_CONFIG_PATH))?
        }
        None => {
            tracing::info!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
            return Ok(Config::new());
        }
    };

    config.apply_env();
    Ok(config)
}
