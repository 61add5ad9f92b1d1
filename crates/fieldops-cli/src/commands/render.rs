//! One-shot tracking run: initialize, render the map, print the directory.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use fieldops_core::error::AppError;
use fieldops_core::types::Identity;
use fieldops_entity::PresenceRecord;
use fieldops_store::create_store;
use fieldops_tracking::view::{entry_label, time_ago};
use fieldops_tracking::{
    ConfiguredGeolocation, LifecycleSignal, ScreenStatus, SessionIdentity, TrackingDeps,
    TrackingScreen,
};

const SNAPSHOT_WAIT: Duration = Duration::from_secs(5);

/// Arguments for the render command
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Where to write the map document (defaults to map.output)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Focus the map on this identity
    #[arg(short, long)]
    pub select: Option<String>,

    /// Sign in as this identity instead of device.identity
    #[arg(long)]
    pub identity: Option<String>,
}

/// One directory row
#[derive(Debug, Serialize, Tabled)]
struct DirectoryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Identity")]
    identity: String,
    #[tabled(rename = "Latitude")]
    latitude: String,
    #[tabled(rename = "Longitude")]
    longitude: String,
    #[tabled(rename = "Accuracy (m)")]
    accuracy: String,
    #[tabled(rename = "Last update")]
    updated: String,
}

impl DirectoryRow {
    fn new(record: &PresenceRecord, viewer: Option<&Identity>, now: DateTime<Utc>) -> Self {
        let fmt = |v: Option<f64>| v.map(|v| format!("{v:.5}")).unwrap_or_default();
        Self {
            name: entry_label(&record.identity, record.label(), viewer).to_string(),
            identity: record.identity.to_string(),
            latitude: fmt(record.latitude),
            longitude: fmt(record.longitude),
            accuracy: record
                .accuracy
                .map(|a| format!("{a:.0}"))
                .unwrap_or_else(|| "-".to_string()),
            updated: time_ago(now, record.last_location_update).to_string(),
        }
    }
}

/// Execute the render command
pub async fn execute(
    args: &RenderArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;

    let identity = args
        .identity
        .as_deref()
        .or(config.device.identity.as_deref())
        .map(Identity::new)
        .transpose()?;
    let session = match identity.clone() {
        Some(id) => SessionIdentity::signed_in(id),
        None => SessionIdentity::signed_out(),
    };

    let screen = TrackingScreen::new(
        TrackingDeps {
            geolocation: Arc::new(ConfiguredGeolocation::new(&config.device)),
            store: create_store(&config.store)?,
            identity: Arc::new(session),
        },
        config.tracking.clone(),
        config.map.clone(),
    );

    let lifecycle = LifecycleSignal::default();
    let status = screen.mount(lifecycle.subscribe()).await;
    if let ScreenStatus::Failed(e) = &status {
        screen.unmount().await;
        return Err(AppError::service_unavailable(e.to_string()));
    }

    if !screen.ensure_directory().await {
        output::print_warning("Presence subscription unavailable, the staff list may be empty");
    }

    // Give the first directory snapshot a moment to arrive.
    let mut entries = screen.directory().watch();
    let _ = tokio::time::timeout(SNAPSHOT_WAIT, entries.wait_for(|e| !e.is_empty())).await;

    if let Some(selected) = &args.select {
        let selected = Identity::new(selected)?;
        if let Err(e) = screen.select(&selected).await {
            output::print_warning(&e.message);
        }
    }

    let now = Utc::now();
    let rendered = screen.render(now).await;
    let rows: Vec<DirectoryRow> = screen
        .presence_list()
        .iter()
        .map(|r| DirectoryRow::new(r, identity.as_ref(), now))
        .collect();
    let summary = screen.summary();
    screen.unmount().await;

    let document = rendered?
        .ok_or_else(|| AppError::not_found("No position available to centre the map on"))?;

    let out_path = args.output.as_deref().unwrap_or(&config.map.output);
    if let Some(parent) = std::path::Path::new(out_path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(out_path, &document.html).await?;

    output::print_list(&rows, format);
    if format == OutputFormat::Table {
        println!();
        println!("{summary}");
        output::print_success(&format!("Map written to '{out_path}'"));
    }
    Ok(())
}
