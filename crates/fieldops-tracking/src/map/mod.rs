//! Map document rendering.
//!
//! [`render_map`] is a pure function of a [`MapView`]: the same records,
//! fix, selection, viewer and clock always give the same document.

pub mod html;
pub mod marker;

use chrono::{DateTime, Utc};
use serde::Serialize;

use fieldops_core::config::MapConfig;
use fieldops_core::result::AppResult;
use fieldops_core::types::{Identity, PositionFix};
use fieldops_entity::PresenceRecord;

pub use html::escape_html;
pub use marker::{Marker, MarkerDiff};

use crate::selection::SelectionState;
use crate::view::{RenderTarget, render_target, time_ago};

/// Everything a map render depends on.
#[derive(Debug, Clone, Copy)]
pub struct MapView<'a> {
    /// Directory entries, all with a usable fix.
    pub records: &'a [PresenceRecord],
    pub own_fix: Option<&'a PositionFix>,
    pub selection: &'a SelectionState,
    /// The signed-in viewer, for own-marker styling.
    pub viewer: Option<&'a Identity>,
    /// Clock for the "last update" labels.
    pub now: DateTime<Utc>,
}

/// A rendered map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDocument {
    pub target: RenderTarget,
    pub markers: Vec<Marker>,
    /// Self-contained Leaflet page.
    pub html: String,
}

/// Build the markers for `view`, in directory order.
pub fn markers(view: &MapView<'_>) -> Vec<Marker> {
    view.records
        .iter()
        .filter_map(|record| {
            let position = record.coordinates()?;
            let own = view.viewer == Some(&record.identity);
            let selected = view.selection.is_selected(&record.identity);
            let (color, border_color, border_width) = Marker::style(own, selected);
            let label = record.label().to_string();
            let popup = format!(
                "<b>{}</b><br>Last update: {}",
                escape_html(&label),
                time_ago(view.now, record.last_location_update)
            );
            Some(Marker {
                identity: record.identity.clone(),
                label,
                latitude: position.latitude,
                longitude: position.longitude,
                color,
                border_color,
                border_width,
                selected,
                own,
                popup,
            })
        })
        .collect()
}

/// Render the map, or `None` while there is nothing to centre on.
pub fn render_map(view: &MapView<'_>, config: &MapConfig) -> AppResult<Option<MapDocument>> {
    let Some(target) = render_target(view.selection, view.own_fix, config) else {
        return Ok(None);
    };
    let markers = markers(view);
    let own = view
        .own_fix
        .filter(|fix| fix.coordinates().is_finite())
        .map(|fix| (fix.latitude, fix.longitude));
    let html = html::document(&target, &markers, own, config)?;
    Ok(Some(MapDocument {
        target,
        markers,
        html,
    }))
}
