//! # fieldops-store
//!
//! Presence store backends for FieldOps. The in-memory backend keeps one
//! document per key with merge-upsert semantics, resolves server
//! timestamps from a monotonic clock, and pushes a full collection
//! snapshot to every subscriber after each write.

#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

#[cfg(feature = "memory")]
pub use memory::MemoryPresenceStore;
pub use provider::create_store;
