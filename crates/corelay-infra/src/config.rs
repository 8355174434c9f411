//! Relay configuration loader.
//!
//! Reads `corelay.toml` from the data directory and deserializes it into
//! [`LinkConfig`]. Falls back to sensible defaults when the file is missing
//! or malformed.

use std::path::Path;

use corelay_types::config::LinkConfig;

/// Load link configuration from `{data_dir}/corelay.toml`.
///
/// - If the file does not exist, returns [`LinkConfig::default()`] (30s
///   request timeout).
/// - If the file exists but fails to read or parse, logs a warning and
///   returns the default.
pub async fn load_link_config(data_dir: &Path) -> LinkConfig {
    let config_path = data_dir.join("corelay.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No corelay.toml found at {}, using defaults",
                config_path.display()
            );
            return LinkConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return LinkConfig::default();
        }
    };

    match toml::from_str::<LinkConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            LinkConfig::default()
        }
    }
}
