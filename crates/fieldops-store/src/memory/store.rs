//! In-memory document store with broadcast snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use tokio::sync::RwLock;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use fieldops_core::error::AppError;
use fieldops_core::result::AppResult;
use fieldops_core::traits::PresenceStore;
use fieldops_core::types::document::Snapshot;
use fieldops_core::types::{Document, DocumentPatch, FieldValue, SnapshotStream};

use super::clock::{ServerClock, timestamp_value};

/// One collection: documents in insertion order plus its snapshot channel.
#[derive(Debug)]
struct Collection {
    /// Keys in first-write order.
    order: Vec<String>,
    /// Key → document.
    documents: HashMap<String, Document>,
    /// Snapshot fan-out to subscribers.
    sender: broadcast::Sender<Snapshot>,
}

impl Collection {
    fn new(buffer_size: usize) -> Self {
        Self {
            order: Vec::new(),
            documents: HashMap::new(),
            sender: broadcast::channel(buffer_size).0,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Arc::new(
            self.order
                .iter()
                .filter_map(|key| self.documents.get(key).cloned())
                .collect(),
        )
    }
}

#[derive(Debug, Default)]
struct StoreState {
    /// Collection name → collection.
    collections: HashMap<String, Collection>,
    /// Clock shared by every collection.
    clock: ServerClock,
}

/// In-memory presence store for single-process deployments and tests.
#[derive(Debug, Clone)]
pub struct MemoryPresenceStore {
    state: Arc<RwLock<StoreState>>,
    /// Per-collection snapshot buffer.
    buffer_size: usize,
}

impl MemoryPresenceStore {
    /// Create an empty store.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Number of live subscribers on a collection.
    pub async fn subscriber_count(&self, collection: &str) -> usize {
        let state = self.state.read().await;
        state
            .collections
            .get(collection)
            .map(|c| c.sender.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for MemoryPresenceStore {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Apply `patch` to `doc`, resolving sentinels to `now`.
fn merge(doc: &mut Document, patch: &DocumentPatch, now: &serde_json::Value) {
    for (field, value) in patch.fields() {
        match value {
            FieldValue::Value(v) => {
                doc.fields.insert(field.clone(), v.clone());
            }
            FieldValue::ServerTimestamp => {
                doc.fields.insert(field.clone(), now.clone());
            }
            FieldValue::ServerTimestampIfAbsent => {
                if !doc.has(field) {
                    doc.fields.insert(field.clone(), now.clone());
                }
            }
        }
    }
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn upsert(&self, collection: &str, key: &str, patch: DocumentPatch) -> AppResult<()> {
        if key.is_empty() {
            return Err(AppError::validation("Document key must not be empty"));
        }

        let mut state = self.state.write().await;
        let now = timestamp_value(state.clock.next());
        let buffer_size = self.buffer_size;

        let coll = state
            .collections
            .entry(collection.to_string())
            .or_insert_with(|| Collection::new(buffer_size));

        let created = !coll.documents.contains_key(key);
        if created {
            coll.order.push(key.to_string());
        }
        let doc = coll
            .documents
            .entry(key.to_string())
            .or_insert_with(|| Document::new(key));
        merge(doc, &patch, &now);

        debug!(collection, key, created, fields = patch.len(), "Upserted document");

        if coll.sender.receiver_count() > 0 {
            // Only fails when every receiver is gone, which is fine.
            let _ = coll.sender.send(coll.snapshot());
        }
        Ok(())
    }

    async fn subscribe(&self, collection: &str) -> AppResult<SnapshotStream> {
        let mut state = self.state.write().await;
        let buffer_size = self.buffer_size;
        let coll = state
            .collections
            .entry(collection.to_string())
            .or_insert_with(|| Collection::new(buffer_size));

        let initial = coll.snapshot();
        let receiver = coll.sender.subscribe();
        let subscription_id = Uuid::new_v4();
        let name = collection.to_string();

        debug!(
            collection,
            %subscription_id,
            documents = initial.len(),
            "Subscribed to collection"
        );

        let updates = stream::unfold(receiver, move |mut rx| {
            let name = name.clone();
            async move {
                match rx.recv().await {
                    Ok(snapshot) => {
                        trace!(collection = %name, %subscription_id, documents = snapshot.len(), "Snapshot delivered");
                        Some((Ok(snapshot), rx))
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(collection = %name, %subscription_id, skipped, "Subscriber lagged");
                        Some((
                            Err(AppError::subscription(format!(
                                "Subscriber on '{name}' lagged behind by {skipped} snapshots"
                            ))),
                            rx,
                        ))
                    }
                    Err(RecvError::Closed) => None,
                }
            }
        });

        Ok(stream::once(async move { Ok(initial) })
            .chain(updates)
            .boxed())
    }

    async fn get(&self, collection: &str, key: &str) -> AppResult<Option<Document>> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .and_then(|c| c.documents.get(key))
            .cloned())
    }

    async fn list(&self, collection: &str) -> AppResult<Vec<Document>> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .map(|c| c.snapshot().as_ref().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use fieldops_core::types::{Identity, PositionFix};
    use fieldops_entity::{PresenceRecord, PresenceUpdate};

    use super::*;

    const USERS: &str = "users";

    fn identity(key: &str) -> Identity {
        Identity::new(key).unwrap()
    }

    async fn record(store: &MemoryPresenceStore, key: &str) -> PresenceRecord {
        let doc = store.get(USERS, key).await.unwrap().unwrap();
        PresenceRecord::from_document(&doc).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_creates_then_merges() {
        let store = MemoryPresenceStore::default();
        let id = identity("ayse@example.com");

        store
            .upsert(USERS, id.as_str(), PresenceUpdate::profile(&id))
            .await
            .unwrap();
        let profile = record(&store, id.as_str()).await;
        assert!(profile.latitude.is_none());
        assert_eq!(profile.display_name.as_deref(), Some("ayse"));

        let fix = PositionFix::new(40.0, 29.0, Some(10.0));
        store
            .upsert(USERS, id.as_str(), PresenceUpdate::location(&id, &fix))
            .await
            .unwrap();
        let located = record(&store, id.as_str()).await;
        assert_eq!(located.latitude, Some(40.0));
        assert_eq!(located.display_name.as_deref(), Some("ayse"));
        assert_eq!(located.created_at, profile.created_at);
    }

    #[tokio::test]
    async fn test_same_patch_twice_is_one_record_with_newer_timestamp() {
        let store = MemoryPresenceStore::default();
        let id = identity("ayse@example.com");
        let fix = PositionFix::new(40.0, 29.0, Some(10.0));

        store
            .upsert(USERS, id.as_str(), PresenceUpdate::location(&id, &fix))
            .await
            .unwrap();
        let first = record(&store, id.as_str()).await;

        store
            .upsert(USERS, id.as_str(), PresenceUpdate::location(&id, &fix))
            .await
            .unwrap();
        let second = record(&store, id.as_str()).await;

        assert_eq!(store.list(USERS).await.unwrap().len(), 1);
        assert!(second.last_location_update > first.last_location_update);
        assert_eq!(second.created_at, first.created_at);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_same_key() {
        let store = MemoryPresenceStore::default();
        let id = identity("ayse@example.com");
        let a = PresenceUpdate::location(&id, &PositionFix::new(40.0, 29.0, None));
        let b = PresenceUpdate::location(&id, &PositionFix::new(40.1, 29.1, None));

        let (ra, rb) = tokio::join!(
            store.upsert(USERS, id.as_str(), a),
            store.upsert(USERS, id.as_str(), b)
        );
        ra.unwrap();
        rb.unwrap();

        assert_eq!(store.list(USERS).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let store = MemoryPresenceStore::default();
        for key in ["c@example.com", "a@example.com", "b@example.com"] {
            let id = identity(key);
            store
                .upsert(USERS, key, PresenceUpdate::profile(&id))
                .await
                .unwrap();
        }
        // Rewriting an existing key does not move it.
        let id = identity("c@example.com");
        store
            .upsert(USERS, "c@example.com", PresenceUpdate::profile(&id))
            .await
            .unwrap();

        let keys: Vec<String> = store
            .list(USERS)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.key)
            .collect();
        assert_eq!(keys, vec!["c@example.com", "a@example.com", "b@example.com"]);
    }

    #[tokio::test]
    async fn test_subscribe_yields_initial_then_updates() {
        let store = MemoryPresenceStore::default();
        let id = identity("ayse@example.com");
        store
            .upsert(USERS, id.as_str(), PresenceUpdate::profile(&id))
            .await
            .unwrap();

        let mut stream = store.subscribe(USERS).await.unwrap();
        let initial = stream.next().await.unwrap().unwrap();
        assert_eq!(initial.len(), 1);

        let other = identity("veli@example.com");
        store
            .upsert(USERS, other.as_str(), PresenceUpdate::profile(&other))
            .await
            .unwrap();
        let update = stream.next().await.unwrap().unwrap();
        assert_eq!(update.len(), 2);
    }

    #[tokio::test]
    async fn test_dropping_stream_unsubscribes() {
        let store = MemoryPresenceStore::default();
        let stream = store.subscribe(USERS).await.unwrap();
        assert_eq!(store.subscriber_count(USERS).await, 1);
        drop(stream);
        assert_eq!(store.subscriber_count(USERS).await, 0);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_gets_error_then_recovers() {
        let store = MemoryPresenceStore::new(1);
        let mut stream = store.subscribe(USERS).await.unwrap();
        let _ = stream.next().await;

        for key in ["a@example.com", "b@example.com", "c@example.com"] {
            let id = identity(key);
            store
                .upsert(USERS, key, PresenceUpdate::profile(&id))
                .await
                .unwrap();
        }

        let lagged = stream.next().await.unwrap();
        assert!(lagged.is_err());
        let latest = stream.next().await.unwrap().unwrap();
        assert_eq!(latest.len(), 3);
    }

    #[tokio::test]
    async fn test_timestamps_are_rfc3339() {
        let store = MemoryPresenceStore::default();
        let id = identity("ayse@example.com");
        store
            .upsert(USERS, id.as_str(), PresenceUpdate::profile(&id))
            .await
            .unwrap();
        let doc = store.get(USERS, id.as_str()).await.unwrap().unwrap();
        let raw = doc.get("lastSeen").and_then(|v| v.as_str()).unwrap();
        assert!(raw.parse::<DateTime<Utc>>().is_ok());
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let store = MemoryPresenceStore::default();
        let result = store.upsert(USERS, "", DocumentPatch::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unknown_collection_is_empty() {
        let store = MemoryPresenceStore::default();
        assert!(store.list("nothing").await.unwrap().is_empty());
        assert!(store.get("nothing", "x").await.unwrap().is_none());
    }
}
