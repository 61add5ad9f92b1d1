//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use tokio::sync::mpsc;

use fieldops_core::config::{MapConfig, TrackingConfig};
use fieldops_core::error::AppError;
use fieldops_core::result::AppResult;
use fieldops_core::traits::{GeolocationSource, PresenceStore};
use fieldops_core::types::document::Snapshot;
use fieldops_core::types::{
    Document, DocumentPatch, Identity, LocationError, PermissionStatus, PositionFix,
    PositionRequest, SnapshotStream,
};
use fieldops_store::MemoryPresenceStore;
use fieldops_tracking::{LifecycleSignal, SessionIdentity, TrackingDeps, TrackingScreen};

pub const USERS: &str = "users";

pub fn identity(key: &str) -> Identity {
    Identity::new(key).unwrap()
}

/// Geolocation double whose answers are queued by the test.
#[derive(Debug)]
pub struct ScriptedGeolocation {
    /// Answers handed out in order; `fallback` once empty.
    script: Mutex<VecDeque<Result<PositionFix, LocationError>>>,
    fallback: Mutex<Result<PositionFix, LocationError>>,
    requests: AtomicUsize,
    /// Simulated time to get a fix.
    latency: Duration,
    pub services_enabled: AtomicBool,
    pub foreground: AtomicBool,
    pub background: AtomicBool,
}

impl ScriptedGeolocation {
    pub fn at(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Ok(PositionFix::new(latitude, longitude, Some(accuracy)))),
            requests: AtomicUsize::new(0),
            latency: Duration::ZERO,
            services_enabled: AtomicBool::new(true),
            foreground: AtomicBool::new(true),
            background: AtomicBool::new(false),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue one answer.
    pub fn push(&self, answer: Result<PositionFix, LocationError>) {
        self.script.lock().unwrap().push_back(answer);
    }

    /// Answer used once the queue is empty.
    pub fn set_fallback(&self, answer: Result<PositionFix, LocationError>) {
        *self.fallback.lock().unwrap() = answer;
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

fn status(granted: bool) -> PermissionStatus {
    if granted {
        PermissionStatus::Granted
    } else {
        PermissionStatus::Denied
    }
}

#[async_trait]
impl GeolocationSource for ScriptedGeolocation {
    async fn has_services_enabled(&self) -> Result<bool, LocationError> {
        Ok(self.services_enabled.load(Ordering::SeqCst))
    }

    async fn request_foreground_permission(&self) -> Result<PermissionStatus, LocationError> {
        Ok(status(self.foreground.load(Ordering::SeqCst)))
    }

    async fn request_background_permission(&self) -> Result<PermissionStatus, LocationError> {
        Ok(status(self.background.load(Ordering::SeqCst)))
    }

    async fn current_position(
        &self,
        _request: &PositionRequest,
    ) -> Result<PositionFix, LocationError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let queued = self.script.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| self.fallback.lock().unwrap().clone())
    }
}

/// Memory store whose writes and subscriptions can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryPresenceStore,
    pub fail_writes: AtomicBool,
    pub writes: AtomicUsize,
    /// Number of upcoming `subscribe` calls to refuse.
    pub fail_subscribes: AtomicUsize,
}

#[async_trait]
impl PresenceStore for FlakyStore {
    async fn upsert(&self, collection: &str, key: &str, patch: DocumentPatch) -> AppResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::store("Write rejected by backend"));
        }
        self.inner.upsert(collection, key, patch).await
    }

    async fn subscribe(&self, collection: &str) -> AppResult<SnapshotStream> {
        let refused = self
            .fail_subscribes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(AppError::subscription("Subscription refused by backend"));
        }
        self.inner.subscribe(collection).await
    }

    async fn get(&self, collection: &str, key: &str) -> AppResult<Option<Document>> {
        self.inner.get(collection, key).await
    }

    async fn list(&self, collection: &str) -> AppResult<Vec<Document>> {
        self.inner.list(collection).await
    }
}

/// Store whose subscription delivers whatever the test feeds it.
#[derive(Debug)]
pub struct FeedStore {
    receiver: Mutex<Option<mpsc::UnboundedReceiver<AppResult<Snapshot>>>>,
}

impl FeedStore {
    /// The store and the sender that drives its single subscription.
    pub fn new() -> (Self, mpsc::UnboundedSender<AppResult<Snapshot>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                receiver: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

#[async_trait]
impl PresenceStore for FeedStore {
    async fn upsert(&self, _collection: &str, _key: &str, _patch: DocumentPatch) -> AppResult<()> {
        Err(AppError::store("Read-only feed"))
    }

    async fn subscribe(&self, _collection: &str) -> AppResult<SnapshotStream> {
        let rx = self
            .receiver
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| AppError::subscription("Feed already subscribed"))?;
        Ok(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed())
    }

    async fn get(&self, _collection: &str, _key: &str) -> AppResult<Option<Document>> {
        Ok(None)
    }

    async fn list(&self, _collection: &str) -> AppResult<Vec<Document>> {
        Ok(Vec::new())
    }
}

/// Build a stored document from JSON fields.
pub fn document(key: &str, fields: serde_json::Value) -> Document {
    let mut doc = Document::new(key);
    if let serde_json::Value::Object(map) = fields {
        doc.fields = map;
    }
    doc
}

pub fn snapshot(docs: Vec<Document>) -> Snapshot {
    Arc::new(docs)
}

/// A mounted-ready screen plus its doubles.
pub struct TestTracker {
    pub screen: TrackingScreen,
    pub geolocation: Arc<ScriptedGeolocation>,
    pub store: Arc<FlakyStore>,
    pub session: Arc<SessionIdentity>,
    pub lifecycle: LifecycleSignal,
}

impl TestTracker {
    /// Signed in as `key`, standing at (40.0, 29.0) with 10 m accuracy.
    pub fn signed_in(key: &str) -> Self {
        Self::build(
            ScriptedGeolocation::at(40.0, 29.0, 10.0),
            SessionIdentity::signed_in(identity(key)),
        )
    }

    pub fn build(geolocation: ScriptedGeolocation, session: SessionIdentity) -> Self {
        let geolocation = Arc::new(geolocation);
        let store = Arc::new(FlakyStore::default());
        let session = Arc::new(session);
        let screen = TrackingScreen::new(
            TrackingDeps {
                geolocation: geolocation.clone(),
                store: store.clone(),
                identity: session.clone(),
            },
            TrackingConfig::default(),
            MapConfig::default(),
        );
        Self {
            screen,
            geolocation,
            store,
            session,
            lifecycle: LifecycleSignal::default(),
        }
    }

    /// Wait until the directory shows `count` entries.
    pub async fn wait_for_entries(&self, count: usize) {
        let mut entries = self.screen.directory().watch();
        entries.wait_for(|e| e.len() == count).await.unwrap();
    }
}
