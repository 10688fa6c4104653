// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a file (JSON for `.json`, YAML otherwise)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    // YAML is a superset of JSON, so only `.json` files take the JSON parser.
    let is_json = path.extension().and_then(|s| s.to_str()) == Some("json");

    let document: serde_json::Value = if is_json {
        serde_json::from_str(&contents).context("Failed to parse JSON config")?
    } else {
        serde_yaml::from_str(&contents).context("Failed to parse YAML config")?
    };

    let config = Config::from_value(document).context("Invalid configuration")?;
    Ok(config)
}
