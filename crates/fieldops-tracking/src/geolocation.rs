//! Geolocation source answered from configuration.

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::trace;

use fieldops_core::config::DeviceConfig;
use fieldops_core::traits::GeolocationSource;
use fieldops_core::types::{LocationError, PermissionStatus, PositionFix, PositionRequest};

/// A device whose position and permissions come from [`DeviceConfig`].
///
/// Used by the daemon and CLI where no OS location service exists. The
/// position can be moved at runtime with [`ConfiguredGeolocation::move_to`].
#[derive(Debug)]
pub struct ConfiguredGeolocation {
    position: watch::Sender<PositionFix>,
    services_enabled: bool,
    foreground: bool,
    background: bool,
}

impl ConfiguredGeolocation {
    /// Build from the device section of the configuration.
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            position: watch::Sender::new(PositionFix::new(
                config.latitude,
                config.longitude,
                Some(config.accuracy),
            )),
            services_enabled: config.services_enabled,
            foreground: config.foreground_permission,
            background: config.background_permission,
        }
    }

    /// Move the device.
    pub fn move_to(&self, fix: PositionFix) {
        self.position.send_replace(fix);
    }
}

fn status(granted: bool) -> PermissionStatus {
    if granted {
        PermissionStatus::Granted
    } else {
        PermissionStatus::Denied
    }
}

#[async_trait]
impl GeolocationSource for ConfiguredGeolocation {
    async fn has_services_enabled(&self) -> Result<bool, LocationError> {
        Ok(self.services_enabled)
    }

    async fn request_foreground_permission(&self) -> Result<PermissionStatus, LocationError> {
        Ok(status(self.foreground))
    }

    async fn request_background_permission(&self) -> Result<PermissionStatus, LocationError> {
        Ok(status(self.background))
    }

    async fn current_position(
        &self,
        request: &PositionRequest,
    ) -> Result<PositionFix, LocationError> {
        if !self.services_enabled {
            return Err(LocationError::ServiceUnavailable);
        }
        if !self.foreground {
            return Err(LocationError::PermissionDenied);
        }
        let fix = *self.position.borrow();
        trace!(?request, latitude = fix.latitude, longitude = fix.longitude, "Configured fix");
        Ok(fix)
    }
}
