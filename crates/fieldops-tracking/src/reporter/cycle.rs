//! Report cycle triggers and outcomes.

use fieldops_core::error::AppError;
use fieldops_core::types::{LocationError, PositionFix};

/// What started a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleTrigger {
    /// The fixed-period timer.
    Periodic,
    /// The app returned to the foreground.
    Activation,
}

impl CycleTrigger {
    /// Lowercase name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Periodic => "periodic",
            Self::Activation => "activation",
        }
    }
}

/// The result of one acquire-and-report cycle.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// Nobody is signed in; nothing was attempted.
    Skipped,
    /// The fix was acquired and written.
    Reported(PositionFix),
    /// No fix could be acquired.
    AcquisitionFailed(LocationError),
    /// The fix was acquired but the store write failed.
    WriteFailed {
        /// The acquired fix.
        fix: PositionFix,
        /// The store error.
        error: AppError,
    },
}

impl CycleOutcome {
    /// Whether the store now holds this cycle's fix.
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::Reported(_))
    }

    /// The fix acquired during the cycle, if any.
    pub fn fix(&self) -> Option<&PositionFix> {
        match self {
            Self::Reported(fix) | Self::WriteFailed { fix, .. } => Some(fix),
            Self::Skipped | Self::AcquisitionFailed(_) => None,
        }
    }
}
