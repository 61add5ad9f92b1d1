//! Configured device settings.

use serde::{Deserialize, Serialize};

/// The device the daemon and CLI report for.
///
/// Stands in for the OS location service when running off-device: the
/// position is fixed and permissions are answered from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Signed-in identity; `None` behaves as signed out.
    #[serde(default)]
    pub identity: Option<String>,
    /// Reported latitude.
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    /// Reported longitude.
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// Reported accuracy radius in metres.
    #[serde(default = "default_accuracy")]
    pub accuracy: f64,
    /// Whether OS location services are enabled.
    #[serde(default = "default_true")]
    pub services_enabled: bool,
    /// Whether the foreground permission is granted.
    #[serde(default = "default_true")]
    pub foreground_permission: bool,
    /// Whether the background permission is granted.
    #[serde(default)]
    pub background_permission: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            identity: None,
            latitude: default_latitude(),
            longitude: default_longitude(),
            accuracy: default_accuracy(),
            services_enabled: true,
            foreground_permission: true,
            background_permission: false,
        }
    }
}

fn default_latitude() -> f64 {
    40.0
}

fn default_longitude() -> f64 {
    29.0
}

fn default_accuracy() -> f64 {
    10.0
}

fn default_true() -> bool {
    true
}
