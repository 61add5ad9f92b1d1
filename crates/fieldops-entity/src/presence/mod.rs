//! Presence domain entities.

pub mod model;
pub mod update;

pub use model::PresenceRecord;
pub use update::PresenceUpdate;

/// Document field names shared by the record decoder and the update builders.
pub mod fields {
    /// Stable user key.
    pub const IDENTITY: &str = "identity";
    /// UI label.
    pub const DISPLAY_NAME: &str = "displayName";
    /// Last reported latitude.
    pub const LATITUDE: &str = "latitude";
    /// Last reported longitude.
    pub const LONGITUDE: &str = "longitude";
    /// Accuracy radius of the last fix.
    pub const ACCURACY: &str = "accuracy";
    /// Liveness flag.
    pub const IS_ONLINE: &str = "isOnline";
    /// Server time of the last location write.
    pub const LAST_LOCATION_UPDATE: &str = "lastLocationUpdate";
    /// Server time of the last write of any kind.
    pub const LAST_SEEN: &str = "lastSeen";
    /// Server time the record was created.
    pub const CREATED_AT: &str = "createdAt";
}
