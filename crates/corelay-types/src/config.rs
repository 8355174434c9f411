//! Relay configuration types.
//!
//! `LinkConfig` represents the `corelay.toml` that controls request/reply
//! timing.

use serde::{Deserialize, Serialize};

use std::time::Duration;

/// Configuration for relay link operations.
///
/// Loaded from `{data_dir}/corelay.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Default wait for a request/reply exchange, in milliseconds.
    /// Individual requests may override this per call.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl LinkConfig {
    /// The default request/reply wait as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}
