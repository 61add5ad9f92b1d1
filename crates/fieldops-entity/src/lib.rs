//! # fieldops-entity
//!
//! Domain entities for FieldOps location tracking. A [`PresenceRecord`]
//! is the decoded form of one document in the presence collection;
//! [`PresenceUpdate`] builds the partial documents the reporter writes.

pub mod presence;

pub use presence::{PresenceRecord, PresenceUpdate};
