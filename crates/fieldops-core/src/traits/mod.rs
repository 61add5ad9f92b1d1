//! Collaborator traits defined in `fieldops-core` and implemented by other
//! crates (or by the host platform).

pub mod geolocation;
pub mod identity;
pub mod store;

pub use geolocation::GeolocationSource;
pub use identity::IdentityProvider;
pub use store::PresenceStore;
