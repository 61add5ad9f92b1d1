//! Position fixes, requests, and geolocation failures.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;

/// Accuracy tier requested from the OS location provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyTier {
    /// Roughly 3 km.
    Lowest,
    /// Roughly 1 km.
    Low,
    /// Roughly 100 m; avoids engaging GPS where possible.
    #[default]
    Balanced,
    /// Roughly 10 m.
    High,
    /// Best the device can do.
    Highest,
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Create a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// A single position fix from the geolocation source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Accuracy radius in metres, advisory only.
    pub accuracy: Option<f64>,
}

impl PositionFix {
    /// Create a fix.
    pub fn new(latitude: f64, longitude: f64, accuracy: Option<f64>) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
        }
    }

    /// The fix's coordinates.
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Parameters for a single fix request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRequest {
    /// Requested accuracy.
    pub accuracy: AccuracyTier,
    /// Give up after this long.
    pub timeout: Duration,
    /// Accept a cached fix no older than this.
    pub max_cached_age: Duration,
}

/// Outcome of a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// The user granted access.
    Granted,
    /// The user refused access.
    Denied,
}

impl PermissionStatus {
    /// Whether access was granted.
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Failures reported by a geolocation source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    /// No fix arrived within the request timeout.
    #[error("location request timed out")]
    Timeout,
    /// The provider is switched off or not present.
    #[error("location provider unavailable")]
    ServiceUnavailable,
    /// Location permission is missing or was revoked.
    #[error("location permission denied")]
    PermissionDenied,
    /// Any other provider failure.
    #[error("location provider error: {0}")]
    Provider(String),
}

impl From<LocationError> for AppError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::Timeout => AppError::timeout(err.to_string()),
            LocationError::ServiceUnavailable => AppError::service_unavailable(err.to_string()),
            LocationError::PermissionDenied => AppError::permission(err.to_string()),
            LocationError::Provider(_) => AppError::internal(err.to_string()),
        }
    }
}
