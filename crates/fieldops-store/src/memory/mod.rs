//! In-memory presence store.

pub mod clock;
pub mod store;

pub use store::MemoryPresenceStore;
