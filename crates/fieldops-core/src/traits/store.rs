//! Presence store trait for pluggable document backends.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::document::{Document, DocumentPatch, SnapshotStream};

/// A hosted document collection keyed by identity.
///
/// Every active device writes only its own record, so the backend's
/// per-key last-write-wins upsert is the sole consistency guarantee.
#[async_trait]
pub trait PresenceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Merge-write `patch` into the document at `key`, creating it if absent.
    ///
    /// Server timestamp sentinels in the patch are resolved to the
    /// backend's clock at write time.
    async fn upsert(&self, collection: &str, key: &str, patch: DocumentPatch) -> AppResult<()>;

    /// Subscribe to a collection.
    ///
    /// The stream yields the full current set of documents immediately and
    /// again after every change. Errors are delivered in-band; the stream
    /// ends when the backend shuts down. Dropping the stream unsubscribes.
    async fn subscribe(&self, collection: &str) -> AppResult<SnapshotStream>;

    /// Fetch a single document.
    async fn get(&self, collection: &str, key: &str) -> AppResult<Option<Document>>;

    /// Fetch every document in a collection, in insertion order.
    async fn list(&self, collection: &str) -> AppResult<Vec<Document>>;
}
