//! Presence store factory.

use std::sync::Arc;

use tracing::info;

use fieldops_core::config::StoreConfig;
use fieldops_core::error::AppError;
use fieldops_core::result::AppResult;
use fieldops_core::traits::PresenceStore;

/// Build the presence store selected by `config.provider`.
pub fn create_store(config: &StoreConfig) -> AppResult<Arc<dyn PresenceStore>> {
    match config.provider.as_str() {
        #[cfg(feature = "memory")]
        "memory" => {
            info!(
                snapshot_buffer = config.snapshot_buffer,
                "Using in-memory presence store"
            );
            Ok(Arc::new(crate::memory::MemoryPresenceStore::new(
                config.snapshot_buffer,
            )))
        }
        other => Err(AppError::configuration(format!(
            "Unknown presence store provider: '{other}'"
        ))),
    }
}
