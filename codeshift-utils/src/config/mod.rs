//! Configuration file loading
//!
//! Files are decoded by extension (`.toml`, `.json`, `.yml`/`.yaml`) straight
//! into the caller's serde type.

use serde::Deserialize;
use std::path::Path;

/// Load configuration from file, picking the decoder from the extension
pub fn load_config<T>(path: &Path) -> crate::Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    let content = std::fs::read_to_string(path)?;

    match extension.as_str() {
        "toml" => toml::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("TOML parse error: {e}"))),
        "json" => serde_json::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("JSON parse error: {e}"))),
        "yml" | "yaml" => serde_yaml::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("YAML parse error: {e}"))),
        _ => Err(crate::UtilError::Config(format!(
            "Unsupported config format: {extension}"
        ))),
    }
}
