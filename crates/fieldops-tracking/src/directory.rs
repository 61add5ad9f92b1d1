//! Live view of every staff member with a known position.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use fieldops_core::result::AppResult;
use fieldops_core::traits::PresenceStore;
use fieldops_core::types::{Document, Identity, SnapshotStream};
use fieldops_entity::PresenceRecord;

use crate::handle::TaskHandle;

/// Presence records that carry a usable fix, in store order.
///
/// Each store snapshot replaces the whole set. A subscription error keeps
/// the last good set.
#[derive(Debug)]
pub struct PresenceDirectory {
    entries: watch::Sender<Arc<Vec<PresenceRecord>>>,
}

impl PresenceDirectory {
    /// An empty directory.
    pub fn new() -> Self {
        Self {
            entries: watch::Sender::new(Arc::new(Vec::new())),
        }
    }

    /// Current entries.
    pub fn entries(&self) -> Arc<Vec<PresenceRecord>> {
        self.entries.borrow().clone()
    }

    /// Follow entry changes.
    pub fn watch(&self) -> watch::Receiver<Arc<Vec<PresenceRecord>>> {
        self.entries.subscribe()
    }

    /// Look up one entry by identity.
    pub fn find(&self, identity: &Identity) -> Option<PresenceRecord> {
        self.entries
            .borrow()
            .iter()
            .find(|r| &r.identity == identity)
            .cloned()
    }

    /// Number of visible entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no entry is visible.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Replace the entries with the visible part of `snapshot`.
    pub fn apply_snapshot(&self, snapshot: &[Document]) -> usize {
        let visible = visible_records(snapshot);
        let count = visible.len();
        self.entries.send_replace(Arc::new(visible));
        debug!(documents = snapshot.len(), visible = count, "Presence directory updated");
        count
    }

    /// Subscribe to `collection` and keep the entries in sync until the
    /// returned handle is stopped or dropped.
    pub async fn attach(
        self: &Arc<Self>,
        store: Arc<dyn PresenceStore>,
        collection: &str,
    ) -> AppResult<TaskHandle> {
        let stream = store.subscribe(collection).await?;
        let cancel = CancellationToken::new();

        info!(collection, "Presence directory attached");

        let task = tokio::spawn(Arc::clone(self).follow(
            stream,
            collection.to_string(),
            cancel.clone(),
        ));
        Ok(TaskHandle::new(cancel, vec![task]))
    }

    async fn follow(
        self: Arc<Self>,
        mut stream: SnapshotStream,
        collection: String,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = stream.next() => match next {
                    Some(Ok(snapshot)) => {
                        self.apply_snapshot(&snapshot);
                    }
                    Some(Err(e)) => {
                        warn!(
                            collection = %collection,
                            error = %e,
                            "Presence subscription error, keeping last known entries"
                        );
                    }
                    None => {
                        info!(collection = %collection, "Presence subscription closed");
                        break;
                    }
                },
            }
        }
        debug!(collection = %collection, "Presence directory detached");
    }
}

impl Default for PresenceDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a snapshot and keep the records that have both coordinates.
///
/// Documents that fail to decode are skipped.
pub fn visible_records(snapshot: &[Document]) -> Vec<PresenceRecord> {
    snapshot
        .iter()
        .filter_map(|doc| match PresenceRecord::from_document(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key = %doc.key, error = %e, "Skipping undecodable presence document");
                None
            }
        })
        .filter(PresenceRecord::has_fix)
        .collect()
}
