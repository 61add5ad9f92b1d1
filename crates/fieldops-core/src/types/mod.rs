//! Shared value types used across FieldOps crates.

pub mod document;
pub mod identity;
pub mod lifecycle;
pub mod location;

pub use document::{Document, DocumentPatch, FieldValue, SnapshotStream};
pub use identity::Identity;
pub use lifecycle::AppLifecycle;
pub use location::{
    AccuracyTier, Coordinates, LocationError, PermissionStatus, PositionFix, PositionRequest,
};
