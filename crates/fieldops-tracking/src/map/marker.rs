//! Marker styling and marker-set diffing.

use std::collections::HashMap;

use serde::Serialize;

use fieldops_core::types::Identity;

/// Fill for the viewer's own markers.
pub const OWN_COLOR: &str = "#2196F3";
/// Fill for other staff.
pub const STAFF_COLOR: &str = "#FF9800";
/// Border of the selected marker.
pub const SELECTED_BORDER: &str = "#FF5722";
/// Border of every other marker.
pub const DEFAULT_BORDER: &str = "white";

/// One drawn marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub identity: Identity,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub color: &'static str,
    pub border_color: &'static str,
    pub border_width: u8,
    pub selected: bool,
    /// Whether this is the viewer's own record.
    pub own: bool,
    /// Popup body, already HTML-escaped.
    pub popup: String,
}

impl Marker {
    /// Style for a marker given who is looking and what is selected.
    pub fn style(own: bool, selected: bool) -> (&'static str, &'static str, u8) {
        let color = if own { OWN_COLOR } else { STAFF_COLOR };
        if selected {
            (color, SELECTED_BORDER, 3)
        } else {
            (color, DEFAULT_BORDER, 2)
        }
    }

    fn same_position(&self, other: &Self) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }

    fn same_style(&self, other: &Self) -> bool {
        self.color == other.color
            && self.border_color == other.border_color
            && self.border_width == other.border_width
            && self.popup == other.popup
    }
}

/// Difference between two marker sets, keyed by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerDiff {
    /// New identities.
    pub added: Vec<Identity>,
    /// Identities whose position changed.
    pub moved: Vec<Identity>,
    /// Same position, different styling or popup text.
    pub restyled: Vec<Identity>,
    /// Identities no longer drawn.
    pub removed: Vec<Identity>,
}

impl MarkerDiff {
    /// Compare `previous` against `next`. Output follows the order of the
    /// input sets.
    pub fn between(previous: &[Marker], next: &[Marker]) -> Self {
        let before: HashMap<&Identity, &Marker> =
            previous.iter().map(|m| (&m.identity, m)).collect();
        let after: HashMap<&Identity, &Marker> = next.iter().map(|m| (&m.identity, m)).collect();

        let mut diff = Self::default();
        for marker in next {
            match before.get(&marker.identity) {
                None => diff.added.push(marker.identity.clone()),
                Some(old) if !old.same_position(marker) => {
                    diff.moved.push(marker.identity.clone())
                }
                Some(old) if !old.same_style(marker) => {
                    diff.restyled.push(marker.identity.clone())
                }
                Some(_) => {}
            }
        }
        diff.removed = previous
            .iter()
            .filter(|m| !after.contains_key(&m.identity))
            .map(|m| m.identity.clone())
            .collect();
        diff
    }

    /// Whether nothing needs redrawing.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.moved.is_empty()
            && self.restyled.is_empty()
            && self.removed.is_empty()
    }
}
