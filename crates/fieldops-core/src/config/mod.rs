//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a serde default so an empty file
//! yields a working configuration.

pub mod device;
pub mod logging;
pub mod map;
pub mod store;
pub mod tracking;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use self::device::DeviceConfig;
pub use self::logging::LoggingConfig;
pub use self::map::MapConfig;
pub use self::store::StoreConfig;
pub use self::tracking::TrackingConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Location reporting settings.
    #[serde(default)]
    pub tracking: TrackingConfig,
    /// Presence store backend settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Map rendering settings.
    #[serde(default)]
    pub map: MapConfig,
    /// The locally configured device (identity and position source).
    #[serde(default)]
    pub device: DeviceConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Merges the given file with an optional `config/{env}.toml` overlay
    /// (when `env` is provided) and environment variables prefixed with
    /// `FIELDOPS__`, e.g. `FIELDOPS__TRACKING__REPORT_INTERVAL_SECONDS`.
    pub fn load(path: &str, env: Option<&str>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from(Path::new(path)).required(false));

        if let Some(env) = env {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("FIELDOPS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Parse configuration from an in-memory TOML string.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        let parsed: Self = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject values that would stall or break the reporter.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.tracking.report_interval_seconds == 0 {
            return Err(AppError::configuration(
                "tracking.report_interval_seconds must be greater than zero",
            ));
        }
        if self.tracking.periodic_timeout_seconds == 0 || self.tracking.initial_timeout_seconds == 0
        {
            return Err(AppError::configuration(
                "tracking timeouts must be greater than zero",
            ));
        }
        if self.tracking.collection.trim().is_empty() {
            return Err(AppError::configuration("tracking.collection must not be empty"));
        }
        if self.store.snapshot_buffer == 0 {
            return Err(AppError::configuration(
                "store.snapshot_buffer must be greater than zero",
            ));
        }
        if self.map.refresh_seconds == 0 {
            return Err(AppError::configuration(
                "map.refresh_seconds must be greater than zero",
            ));
        }
        Ok(())
    }
}
