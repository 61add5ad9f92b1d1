//! Geolocation source trait wrapping the OS location service.

use async_trait::async_trait;

use crate::types::location::{LocationError, PermissionStatus, PositionFix, PositionRequest};

/// On-demand position fixes plus the permission gate in front of them.
#[async_trait]
pub trait GeolocationSource: Send + Sync + std::fmt::Debug + 'static {
    /// Whether location services are switched on at the OS level.
    async fn has_services_enabled(&self) -> Result<bool, LocationError>;

    /// Prompt for (or read) the foreground location permission.
    async fn request_foreground_permission(&self) -> Result<PermissionStatus, LocationError>;

    /// Prompt for the background location permission. Best effort.
    async fn request_background_permission(&self) -> Result<PermissionStatus, LocationError>;

    /// Acquire a single fix.
    async fn current_position(&self, request: &PositionRequest)
    -> Result<PositionFix, LocationError>;
}
