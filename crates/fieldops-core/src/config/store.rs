//! Presence store configuration.

use serde::{Deserialize, Serialize};

/// Presence store backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend: `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Number of snapshots buffered per collection before slow
    /// subscribers start lagging.
    #[serde(default = "default_snapshot_buffer")]
    pub snapshot_buffer: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            snapshot_buffer: default_snapshot_buffer(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_snapshot_buffer() -> usize {
    64
}
