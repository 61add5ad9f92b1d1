//! Location reporter: keeps the device's presence record fresh.
//!
//! One acquire-and-report cycle runs during initialization, then every
//! `report_interval` for as long as the returned [`TaskHandle`] lives,
//! plus once on every foreground activation. Periodic cycles never overlap
//! each other; an activation cycle may overlap a periodic one. Both write
//! the same key with last-write-wins upserts, so the worst case is a
//! briefly older position on screen.

pub mod cycle;
pub mod init;
pub mod stats;

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use fieldops_core::config::TrackingConfig;
use fieldops_core::result::AppResult;
use fieldops_core::traits::{GeolocationSource, IdentityProvider, PresenceStore};
use fieldops_core::types::{
    AppLifecycle, Identity, LocationError, PermissionStatus, PositionFix, PositionRequest,
};
use fieldops_entity::PresenceUpdate;

use crate::handle::TaskHandle;
use crate::lifecycle::LifecycleTransition;

pub use cycle::{CycleOutcome, CycleTrigger};
pub use init::{InitError, InitReport, InitStage};
pub use stats::{ReporterStats, StatsSnapshot};

/// Acquires position fixes and upserts them into the presence store.
#[derive(Debug)]
pub struct LocationReporter {
    /// OS location service.
    geolocation: Arc<dyn GeolocationSource>,
    /// Shared presence collection.
    store: Arc<dyn PresenceStore>,
    /// Signed-in session.
    identity: Arc<dyn IdentityProvider>,
    /// Schedule and request settings.
    config: TrackingConfig,
    /// Latest fix acquired on this device.
    own_fix: watch::Sender<Option<PositionFix>>,
    /// Initialization progress.
    stage: watch::Sender<InitStage>,
    /// Cycle counters.
    stats: ReporterStats,
}

impl LocationReporter {
    /// Create a reporter.
    pub fn new(
        geolocation: Arc<dyn GeolocationSource>,
        store: Arc<dyn PresenceStore>,
        identity: Arc<dyn IdentityProvider>,
        config: TrackingConfig,
    ) -> Self {
        Self {
            geolocation,
            store,
            identity,
            config,
            own_fix: watch::Sender::new(None),
            stage: watch::Sender::new(InitStage::Starting),
            stats: ReporterStats::default(),
        }
    }

    /// Latest fix acquired on this device.
    pub fn own_fix(&self) -> Option<PositionFix> {
        *self.own_fix.borrow()
    }

    /// Follow the device's own fix.
    pub fn watch_own_fix(&self) -> watch::Receiver<Option<PositionFix>> {
        self.own_fix.subscribe()
    }

    /// Current initialization stage.
    pub fn stage(&self) -> InitStage {
        *self.stage.borrow()
    }

    /// Follow initialization progress.
    pub fn watch_stage(&self) -> watch::Receiver<InitStage> {
        self.stage.subscribe()
    }

    /// Cycle counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Tracking settings in use.
    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub(crate) fn mark_stage(&self, stage: InitStage) {
        debug!(%stage, "Initialization progress");
        self.stage.send_replace(stage);
    }

    /// Run the initialization sequence.
    ///
    /// Checks run in a fixed order and the first fatal one wins: identity,
    /// OS services, foreground permission, first fix. Profile and location
    /// write failures and a refused background permission are logged and
    /// do not stop initialization.
    pub async fn initialize(&self) -> Result<InitReport, InitError> {
        self.mark_stage(InitStage::Starting);

        let identity = self.identity.current_identity().ok_or_else(|| {
            warn!("Location tracking initialization without a signed-in identity");
            InitError::NotSignedIn
        })?;
        self.mark_stage(InitStage::IdentityChecked);

        let profile_written = match self
            .store
            .upsert(
                &self.config.collection,
                identity.as_str(),
                PresenceUpdate::profile(&identity),
            )
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(identity = %identity, error = %e, "Failed to write presence profile");
                false
            }
        };
        self.mark_stage(InitStage::ProfileSynced);

        match self.geolocation.has_services_enabled().await {
            Ok(true) => {}
            Ok(false) => {
                warn!("Location services are disabled");
                return Err(InitError::ServicesDisabled);
            }
            Err(e) => {
                warn!(error = %e, "Could not check location services, continuing");
            }
        }
        self.mark_stage(InitStage::ServicesChecked);

        match self.geolocation.request_foreground_permission().await {
            Ok(PermissionStatus::Granted) => {}
            Ok(PermissionStatus::Denied) => {
                warn!("Foreground location permission denied");
                return Err(InitError::PermissionDenied);
            }
            Err(e) => {
                warn!(error = %e, "Foreground location permission request failed");
                return Err(InitError::PermissionUnavailable);
            }
        }
        self.mark_stage(InitStage::ForegroundGranted);

        let background_granted = match self.geolocation.request_background_permission().await {
            Ok(status) => status.is_granted(),
            Err(e) => {
                warn!(error = %e, "Background location permission request failed, continuing");
                false
            }
        };
        if !background_granted {
            info!("Background location permission not granted, continuing in foreground-only mode");
        }
        self.mark_stage(InitStage::BackgroundResolved {
            granted: background_granted,
        });

        self.mark_stage(InitStage::AcquiringFix);
        let fix = self
            .acquire(&self.config.initial_request())
            .await
            .map_err(|e| {
                warn!(error = %e, "Initial location fix failed");
                InitError::from(e)
            })?;
        self.own_fix.send_replace(Some(fix));
        self.mark_stage(InitStage::FixAcquired);

        let location_written = match self.write_location(&identity, &fix).await {
            Ok(()) => true,
            Err(e) => {
                error!(identity = %identity, error = %e, "Failed to write initial location");
                false
            }
        };
        self.mark_stage(InitStage::LocationWritten);

        info!(
            identity = %identity,
            latitude = fix.latitude,
            longitude = fix.longitude,
            background_granted,
            "Location tracking initialized"
        );

        Ok(InitReport {
            identity,
            fix,
            background_granted,
            profile_written,
            location_written,
        })
    }

    /// Run one acquire-and-report cycle.
    ///
    /// Never fails: every outcome is logged and returned.
    pub async fn run_cycle(&self, trigger: CycleTrigger) -> CycleOutcome {
        let outcome = self.cycle(trigger).await;
        self.stats.record(&outcome);
        outcome
    }

    async fn cycle(&self, trigger: CycleTrigger) -> CycleOutcome {
        let Some(identity) = self.identity.current_identity() else {
            debug!(trigger = trigger.as_str(), "No signed-in identity, skipping location update");
            return CycleOutcome::Skipped;
        };

        let request = self.config.periodic_request();

        debug!(trigger = trigger.as_str(), identity = %identity, "Acquiring location");

        let fix = match self.acquire(&request).await {
            Ok(fix) => fix,
            Err(e) => {
                warn!(trigger = trigger.as_str(), error = %e, "Location update failed");
                return CycleOutcome::AcquisitionFailed(e);
            }
        };
        self.own_fix.send_replace(Some(fix));

        match self.write_location(&identity, &fix).await {
            Ok(()) => {
                debug!(
                    trigger = trigger.as_str(),
                    latitude = fix.latitude,
                    longitude = fix.longitude,
                    "Location updated"
                );
                CycleOutcome::Reported(fix)
            }
            Err(error) => {
                error!(trigger = trigger.as_str(), error = %error, "Failed to write location");
                CycleOutcome::WriteFailed { fix, error }
            }
        }
    }

    /// Request a fix, enforcing the request timeout locally as well.
    async fn acquire(&self, request: &PositionRequest) -> Result<PositionFix, LocationError> {
        match time::timeout(request.timeout, self.geolocation.current_position(request)).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout),
        }
    }

    async fn write_location(&self, identity: &Identity, fix: &PositionFix) -> AppResult<()> {
        self.store
            .upsert(
                &self.config.collection,
                identity.as_str(),
                PresenceUpdate::location(identity, fix),
            )
            .await
    }

    /// Start the periodic schedule and the foreground-activation listener.
    ///
    /// The first periodic cycle runs one interval from now. Reporting
    /// continues while the app is in the background. Every transition
    /// into the foreground made after `lifecycle` was subscribed triggers
    /// an immediate cycle, even if it happens before the listener task
    /// first runs.
    pub fn start(
        self: &Arc<Self>,
        lifecycle: broadcast::Receiver<LifecycleTransition>,
    ) -> TaskHandle {
        let cancel = CancellationToken::new();

        let periodic = tokio::spawn(Arc::clone(self).run_periodic(cancel.clone()));
        let listener =
            tokio::spawn(Arc::clone(self).listen_for_activation(lifecycle, cancel.clone()));

        info!(
            interval_seconds = self.config.report_interval_seconds,
            collection = %self.config.collection,
            "Location reporting started"
        );

        TaskHandle::new(cancel, vec![periodic, listener])
    }

    async fn run_periodic(self: Arc<Self>, cancel: CancellationToken) {
        let period = self.config.report_interval();
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    self.run_cycle(CycleTrigger::Periodic).await;
                }
            }
        }

        debug!("Periodic location reporting loop ended");
    }

    async fn listen_for_activation(
        self: Arc<Self>,
        mut lifecycle: broadcast::Receiver<LifecycleTransition>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                received = lifecycle.recv() => match received {
                    Ok(transition) if transition.is_activation() => {
                        info!("App became active, updating location now");
                        let reporter = Arc::clone(&self);
                        tokio::spawn(async move {
                            reporter.run_cycle(CycleTrigger::Activation).await;
                        });
                    }
                    Ok(transition) => {
                        if transition.to == AppLifecycle::Background {
                            debug!("App in background, periodic reporting continues");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Lifecycle listener lagged, some transitions were dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Lifecycle signal closed");
                        break;
                    }
                },
            }
        }

        debug!("Activation listener ended");
    }
}
