//! Location reporting configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::location::{AccuracyTier, PositionRequest};

/// Location reporter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Presence store collection holding one record per identity.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Seconds between periodic report cycles.
    #[serde(default = "default_report_interval")]
    pub report_interval_seconds: u64,
    /// Fix timeout for periodic and activation cycles.
    #[serde(default = "default_periodic_timeout")]
    pub periodic_timeout_seconds: u64,
    /// Fix timeout for the initial cycle.
    #[serde(default = "default_initial_timeout")]
    pub initial_timeout_seconds: u64,
    /// Maximum age of a cached fix the OS may return instead of a fresh one.
    #[serde(default = "default_max_cached_age")]
    pub max_cached_age_seconds: u64,
    /// Requested accuracy tier.
    #[serde(default)]
    pub accuracy: AccuracyTier,
}

impl TrackingConfig {
    /// Interval between periodic cycles.
    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_seconds)
    }

    /// Timeout applied to periodic cycles.
    pub fn periodic_timeout(&self) -> Duration {
        Duration::from_secs(self.periodic_timeout_seconds)
    }

    /// Timeout applied to the initial cycle.
    pub fn initial_timeout(&self) -> Duration {
        Duration::from_secs(self.initial_timeout_seconds)
    }

    /// Maximum cached fix age.
    pub fn max_cached_age(&self) -> Duration {
        Duration::from_secs(self.max_cached_age_seconds)
    }

    /// Position request used by the initial cycle.
    pub fn initial_request(&self) -> PositionRequest {
        PositionRequest {
            accuracy: self.accuracy,
            timeout: self.initial_timeout(),
            max_cached_age: self.max_cached_age(),
        }
    }

    /// Position request used by periodic and activation cycles.
    pub fn periodic_request(&self) -> PositionRequest {
        PositionRequest {
            accuracy: self.accuracy,
            timeout: self.periodic_timeout(),
            max_cached_age: self.max_cached_age(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            report_interval_seconds: default_report_interval(),
            periodic_timeout_seconds: default_periodic_timeout(),
            initial_timeout_seconds: default_initial_timeout(),
            max_cached_age_seconds: default_max_cached_age(),
            accuracy: AccuracyTier::default(),
        }
    }
}

fn default_collection() -> String {
    "users".to_string()
}

fn default_report_interval() -> u64 {
    120
}

fn default_periodic_timeout() -> u64 {
    15
}

fn default_initial_timeout() -> u64 {
    30
}

fn default_max_cached_age() -> u64 {
    60
}
