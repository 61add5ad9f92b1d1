//! One mounted tracking screen: reporter, directory, selection, rendering.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock, broadcast, watch};
use tracing::{info, warn};

use fieldops_core::config::{MapConfig, TrackingConfig};
use fieldops_core::result::AppResult;
use fieldops_core::traits::{GeolocationSource, IdentityProvider, PresenceStore};
use fieldops_core::types::{Identity, PositionFix};
use fieldops_entity::PresenceRecord;

use crate::directory::PresenceDirectory;
use crate::handle::TaskHandle;
use crate::lifecycle::LifecycleTransition;
use crate::map::{MapDocument, MapView, render_map};
use crate::reporter::{InitError, InitStage, LocationReporter};
use crate::selection::SelectionState;
use crate::view::ActiveSummary;

/// Collaborators a screen needs.
#[derive(Debug, Clone)]
pub struct TrackingDeps {
    pub geolocation: Arc<dyn GeolocationSource>,
    pub store: Arc<dyn PresenceStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// What the screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenStatus {
    /// Initialization in progress.
    Loading(InitStage),
    /// Initialized. The directory may still be reconnecting, see
    /// [`TrackingScreen::ensure_directory`].
    Ready,
    /// Initialization stopped; a retry is offered.
    Failed(InitError),
}

#[derive(Debug, Default)]
struct Handles {
    reporter: Option<TaskHandle>,
    directory: Option<TaskHandle>,
}

/// Owns everything started for one screen lifetime.
///
/// [`TrackingScreen::mount`] starts the periodic schedule and runs
/// initialization; [`TrackingScreen::unmount`] stops both background loops.
/// Dropping the screen has the same effect as unmounting without waiting.
#[derive(Debug)]
pub struct TrackingScreen {
    reporter: Arc<LocationReporter>,
    directory: Arc<PresenceDirectory>,
    store: Arc<dyn PresenceStore>,
    identity: Arc<dyn IdentityProvider>,
    tracking: TrackingConfig,
    map: MapConfig,
    selection: RwLock<SelectionState>,
    status: Arc<watch::Sender<ScreenStatus>>,
    handles: Mutex<Handles>,
}

impl TrackingScreen {
    pub fn new(deps: TrackingDeps, tracking: TrackingConfig, map: MapConfig) -> Self {
        let reporter = Arc::new(LocationReporter::new(
            deps.geolocation,
            Arc::clone(&deps.store),
            Arc::clone(&deps.identity),
            tracking.clone(),
        ));
        Self {
            reporter,
            directory: Arc::new(PresenceDirectory::new()),
            store: deps.store,
            identity: deps.identity,
            tracking,
            map,
            selection: RwLock::new(SelectionState::new()),
            status: Arc::new(watch::Sender::new(ScreenStatus::Loading(InitStage::Starting))),
            handles: Mutex::new(Handles::default()),
        }
    }

    /// Start the schedule, then initialize.
    ///
    /// The schedule runs whatever the initialization outcome; a failed
    /// initialization can be retried with [`TrackingScreen::retry`].
    pub async fn mount(
        &self,
        lifecycle: broadcast::Receiver<LifecycleTransition>,
    ) -> ScreenStatus {
        {
            let mut handles = self.handles.lock().await;
            if handles.reporter.is_none() {
                handles.reporter = Some(self.reporter.start(lifecycle));
            }
        }
        self.initialize().await
    }

    /// Re-run initialization without restarting the schedule.
    pub async fn retry(&self) -> ScreenStatus {
        info!("Retrying location tracking initialization");
        self.initialize().await
    }

    async fn initialize(&self) -> ScreenStatus {
        self.status
            .send_replace(ScreenStatus::Loading(InitStage::Starting));

        let mut stages = self.reporter.watch_stage();
        let status = Arc::clone(&self.status);
        let progress = tokio::spawn(async move {
            while stages.changed().await.is_ok() {
                let stage = *stages.borrow_and_update();
                status.send_replace(ScreenStatus::Loading(stage));
            }
        });

        let result = self.reporter.initialize().await;
        progress.abort();
        let _ = progress.await;

        let next = match result {
            Ok(report) => {
                if self.ensure_directory().await {
                    info!(identity = %report.identity, "Presence directory live");
                }
                ScreenStatus::Ready
            }
            Err(e) => {
                warn!(error = %e, "Location tracking initialization failed");
                ScreenStatus::Failed(e)
            }
        };
        self.status.send_replace(next.clone());
        next
    }

    /// Subscribe the presence directory unless it is already live.
    ///
    /// A subscription that failed to open or whose stream ended is opened
    /// again. Returns whether the directory is live afterwards.
    pub async fn ensure_directory(&self) -> bool {
        let mut handles = self.handles.lock().await;
        if handles.directory.as_ref().is_some_and(TaskHandle::is_running) {
            self.reporter.mark_stage(InitStage::Subscribed);
            return true;
        }
        match self
            .directory
            .attach(Arc::clone(&self.store), &self.tracking.collection)
            .await
        {
            Ok(handle) => {
                handles.directory = Some(handle);
                self.reporter.mark_stage(InitStage::Subscribed);
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to subscribe to presence updates");
                false
            }
        }
    }

    /// Whether the presence subscription is running.
    pub async fn is_directory_live(&self) -> bool {
        self.handles
            .lock()
            .await
            .directory
            .as_ref()
            .is_some_and(TaskHandle::is_running)
    }

    /// Stop the schedule, the activation listener and the subscription.
    pub async fn unmount(&self) {
        let handles = std::mem::take(&mut *self.handles.lock().await);
        if let Some(reporter) = handles.reporter {
            reporter.stop().await;
        }
        if let Some(directory) = handles.directory {
            directory.stop().await;
        }
        info!("Location tracking screen unmounted");
    }

    pub fn status(&self) -> ScreenStatus {
        self.status.borrow().clone()
    }

    /// Follow status changes.
    pub fn watch_status(&self) -> watch::Receiver<ScreenStatus> {
        self.status.subscribe()
    }

    /// Visible presence entries.
    pub fn presence_list(&self) -> Arc<Vec<PresenceRecord>> {
        self.directory.entries()
    }

    pub fn directory(&self) -> &Arc<PresenceDirectory> {
        &self.directory
    }

    pub fn reporter(&self) -> &Arc<LocationReporter> {
        &self.reporter
    }

    pub fn own_fix(&self) -> Option<PositionFix> {
        self.reporter.own_fix()
    }

    /// Currently selected identity.
    pub async fn selection(&self) -> Option<Identity> {
        self.selection.read().await.identity().cloned()
    }

    /// Focus on one staff member from the current list.
    pub async fn select(&self, identity: &Identity) -> AppResult<PresenceRecord> {
        let entries = self.directory.entries();
        let mut selection = self.selection.write().await;
        selection.select(&entries, identity).cloned()
    }

    /// Return to the viewer's own position.
    pub async fn clear(&self) {
        self.selection.write().await.clear();
    }

    /// Render the map as of `now`.
    pub async fn render(&self, now: DateTime<Utc>) -> AppResult<Option<MapDocument>> {
        let records = self.directory.entries();
        let own_fix = self.own_fix();
        let viewer = self.identity.current_identity();
        let selection = self.selection.read().await;
        let view = MapView {
            records: &records,
            own_fix: own_fix.as_ref(),
            selection: &selection,
            viewer: viewer.as_ref(),
            now,
        };
        render_map(&view, &self.map)
    }

    /// Header summary line.
    pub fn summary(&self) -> ActiveSummary {
        ActiveSummary::new(self.directory.len(), self.tracking.report_interval_seconds)
    }
}
