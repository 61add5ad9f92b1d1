//! Partial presence writes.

use fieldops_core::types::{DocumentPatch, Identity, PositionFix};

use super::fields;

/// Builders for the two writes the reporter makes.
#[derive(Debug, Clone, Copy)]
pub struct PresenceUpdate;

impl PresenceUpdate {
    /// Profile bootstrap written once per initialization.
    ///
    /// `createdAt` is only resolved when the record has none.
    pub fn profile(identity: &Identity) -> DocumentPatch {
        DocumentPatch::new()
            .set(fields::IDENTITY, identity.as_str())
            .set(fields::DISPLAY_NAME, identity.display_name())
            .set(fields::IS_ONLINE, true)
            .server_timestamp(fields::LAST_SEEN)
            .server_timestamp_if_absent(fields::CREATED_AT)
    }

    /// Location report written by every successful cycle.
    pub fn location(identity: &Identity, fix: &PositionFix) -> DocumentPatch {
        DocumentPatch::new()
            .set(fields::IDENTITY, identity.as_str())
            .set(fields::DISPLAY_NAME, identity.display_name())
            .set(fields::LATITUDE, fix.latitude)
            .set(fields::LONGITUDE, fix.longitude)
            .set(fields::ACCURACY, fix.accuracy)
            .set(fields::IS_ONLINE, true)
            .server_timestamp(fields::LAST_LOCATION_UPDATE)
            .server_timestamp(fields::LAST_SEEN)
            .server_timestamp_if_absent(fields::CREATED_AT)
    }
}
