//! FieldOps Tracker, the field-staff location tracking daemon
//!
//! Wires the store, the configured device and the tracking screen together,
//! keeps the device's presence record fresh and re-renders the map document
//! to disk until shut down.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{self, MissedTickBehavior};
use tracing_subscriber::{EnvFilter, fmt};

use fieldops_core::config::AppConfig;
use fieldops_core::error::AppError;
use fieldops_core::types::Identity;
use fieldops_tracking::{
    ConfiguredGeolocation, LifecycleSignal, ScreenStatus, SessionIdentity, TrackingDeps,
    TrackingScreen,
};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Tracker error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file, environment overlay and variables
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("FIELDOPS_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let env = std::env::var("FIELDOPS_ENV").ok();

    AppConfig::load(&config_path, env.as_deref())
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting FieldOps Tracker v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Presence store ───────────────────────────────────
    tracing::info!(
        "Initializing presence store (provider: {})...",
        config.store.provider
    );
    let store = fieldops_store::create_store(&config.store)?;

    // ── Step 2: Session and device ───────────────────────────────
    let session = match config.device.identity.as_deref() {
        Some(key) => SessionIdentity::signed_in(Identity::new(key)?),
        None => {
            tracing::warn!("No device identity configured, running signed out");
            SessionIdentity::signed_out()
        }
    };
    let geolocation = Arc::new(ConfiguredGeolocation::new(&config.device));
    let lifecycle = LifecycleSignal::default();

    // ── Step 3: Tracking screen ──────────────────────────────────
    let screen = TrackingScreen::new(
        TrackingDeps {
            geolocation,
            store,
            identity: Arc::new(session),
        },
        config.tracking.clone(),
        config.map.clone(),
    );

    tracing::info!("Mounting tracking screen...");
    match screen.mount(lifecycle.subscribe()).await {
        ScreenStatus::Ready => tracing::info!("Tracking ready"),
        ScreenStatus::Failed(e) => {
            tracing::warn!("Initialization failed: {}; periodic reporting continues", e)
        }
        ScreenStatus::Loading(stage) => tracing::debug!("Still loading: {}", stage),
    }

    // ── Step 4: Map refresh loop ─────────────────────────────────
    let mut refresh = time::interval(Duration::from_secs(config.map.refresh_seconds));
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
            _ = refresh.tick() => {
                match screen.status() {
                    ScreenStatus::Failed(_) => {
                        screen.retry().await;
                    }
                    ScreenStatus::Ready => {
                        screen.ensure_directory().await;
                    }
                    ScreenStatus::Loading(_) => {}
                }
                if let Err(e) = write_map(&screen, &config.map.output).await {
                    tracing::warn!("Failed to write map: {}", e);
                }
            }
        }
    }

    // ── Step 5: Teardown ─────────────────────────────────────────
    screen.unmount().await;
    tracing::info!("FieldOps Tracker stopped");
    Ok(())
}

/// Render the current map and write it to `path`
async fn write_map(screen: &TrackingScreen, path: &str) -> Result<(), AppError> {
    let Some(document) = screen.render(Utc::now()).await? else {
        tracing::debug!("No position yet, skipping map render");
        return Ok(());
    };

    if let Some(parent) = std::path::Path::new(path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &document.html).await?;

    tracing::debug!(
        markers = document.markers.len(),
        summary = %screen.summary(),
        "Map written to '{}'",
        path
    );
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
