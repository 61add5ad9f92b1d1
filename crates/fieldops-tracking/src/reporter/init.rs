//! Initialization outcomes and progress stages.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use fieldops_core::types::{Identity, LocationError, PositionFix};

/// Why initialization stopped, in the order the checks run.
///
/// The `Display` text is shown to the user next to a retry button.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    /// Nobody is signed in.
    #[error("You are not signed in. Please sign in again.")]
    NotSignedIn,
    /// Location services are switched off at the OS level.
    #[error("Location services are turned off. Please enable location services.")]
    ServicesDisabled,
    /// The foreground location permission was refused.
    #[error("Location permission was denied. Enable location access in settings.")]
    PermissionDenied,
    /// The permission prompt itself failed.
    #[error("Could not request location permission. Please try again.")]
    PermissionUnavailable,
    /// The first fix did not arrive in time.
    #[error("Timed out while getting your location. Please try again.")]
    Timeout,
    /// The location provider is not available.
    #[error("Location service is unavailable. Please check your location settings.")]
    ProviderUnavailable,
    /// Any other failure while acquiring the first fix.
    #[error("Could not get your location: {0}")]
    Acquisition(String),
}

impl From<LocationError> for InitError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::Timeout => Self::Timeout,
            LocationError::ServiceUnavailable => Self::ProviderUnavailable,
            LocationError::PermissionDenied => Self::PermissionDenied,
            LocationError::Provider(msg) => Self::Acquisition(msg),
        }
    }
}

/// Progress through initialization, for loading screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStage {
    /// Nothing checked yet.
    Starting,
    /// A signed-in identity was found.
    IdentityChecked,
    /// The profile write finished (successfully or not).
    ProfileSynced,
    /// Location services are on (or could not be probed).
    ServicesChecked,
    /// Foreground permission granted.
    ForegroundGranted,
    /// Background permission resolved; denial is not fatal.
    BackgroundResolved {
        /// Whether background access was granted.
        granted: bool,
    },
    /// Waiting for the first fix.
    AcquiringFix,
    /// The first fix arrived.
    FixAcquired,
    /// The first fix was written (or the write failed and was logged).
    LocationWritten,
    /// The presence directory is live.
    Subscribed,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => write!(f, "Starting..."),
            Self::IdentityChecked => write!(f, "Account checked"),
            Self::ProfileSynced => write!(f, "Profile synced"),
            Self::ServicesChecked => write!(f, "Location services on"),
            Self::ForegroundGranted => write!(f, "Location permission granted"),
            Self::BackgroundResolved { granted: true } => {
                write!(f, "Background location permission granted")
            }
            Self::BackgroundResolved { granted: false } => {
                write!(f, "Background location permission not granted (continuing)")
            }
            Self::AcquiringFix => write!(f, "Getting location..."),
            Self::FixAcquired => write!(f, "Location acquired"),
            Self::LocationWritten => write!(f, "Location saved"),
            Self::Subscribed => write!(f, "Listening for staff locations"),
        }
    }
}

/// What a successful initialization established.
#[derive(Debug, Clone, PartialEq)]
pub struct InitReport {
    /// The signed-in identity.
    pub identity: Identity,
    /// The first fix.
    pub fix: PositionFix,
    /// Whether background access was granted.
    pub background_granted: bool,
    /// Whether the profile write succeeded.
    pub profile_written: bool,
    /// Whether the first location write succeeded.
    pub location_written: bool,
}
