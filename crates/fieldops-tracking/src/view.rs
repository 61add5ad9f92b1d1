//! Derived view values: map focus, "time since" labels, the summary line.
//!
//! Everything here is a pure function of its inputs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use fieldops_core::config::MapConfig;
use fieldops_core::types::{Coordinates, Identity, PositionFix};

use crate::selection::SelectionState;

/// What the map is centred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    /// The selected staff member.
    Selection,
    /// The viewer's own position.
    Own,
}

/// Map centre and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderTarget {
    pub center: Coordinates,
    pub zoom: u8,
    pub focus: Focus,
}

/// Choose the map centre.
///
/// A selection with a usable position wins at the tight zoom; otherwise the
/// viewer's own fix at the default zoom. `None` while neither is known.
pub fn render_target(
    selection: &SelectionState,
    own_fix: Option<&PositionFix>,
    config: &MapConfig,
) -> Option<RenderTarget> {
    if let Some(center) = selection.selected().and_then(|r| r.coordinates()) {
        return Some(RenderTarget {
            center,
            zoom: config.selected_zoom,
            focus: Focus::Selection,
        });
    }
    own_fix
        .map(PositionFix::coordinates)
        .filter(Coordinates::is_finite)
        .map(|center| RenderTarget {
            center,
            zoom: config.default_zoom,
            focus: Focus::Own,
        })
}

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Age of a timestamp, bucketed for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "unit", content = "value")]
pub enum TimeAgo {
    /// No timestamp recorded.
    Unknown,
    Seconds(u64),
    Minutes(u64),
    Hours(u64),
    Days(u64),
}

/// Bucket an age in seconds: <60 seconds, <3600 minutes, <86400 hours,
/// otherwise days. Each bucket floors.
pub fn time_ago_seconds(elapsed: u64) -> TimeAgo {
    match elapsed {
        s if s < MINUTE => TimeAgo::Seconds(s),
        s if s < HOUR => TimeAgo::Minutes(s / MINUTE),
        s if s < DAY => TimeAgo::Hours(s / HOUR),
        s => TimeAgo::Days(s / DAY),
    }
}

/// Age of `timestamp` at `now`. Timestamps in the future count as zero.
pub fn time_ago(now: DateTime<Utc>, timestamp: Option<DateTime<Utc>>) -> TimeAgo {
    match timestamp {
        None => TimeAgo::Unknown,
        Some(ts) => {
            let elapsed = now.signed_duration_since(ts).num_seconds().max(0);
            time_ago_seconds(elapsed.unsigned_abs())
        }
    }
}

impl TimeAgo {
    /// Whether the label is in the seconds bucket.
    pub fn is_seconds(&self) -> bool {
        matches!(self, Self::Seconds(_))
    }

    /// Whether the label is in the minutes bucket.
    pub fn is_minutes(&self) -> bool {
        matches!(self, Self::Minutes(_))
    }
}

fn plural(f: &mut fmt::Formatter<'_>, n: u64, unit: &str) -> fmt::Result {
    if n == 1 {
        write!(f, "1 {unit} ago")
    } else {
        write!(f, "{n} {unit}s ago")
    }
}

impl fmt::Display for TimeAgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unknown => write!(f, "unknown"),
            Self::Seconds(0) => write!(f, "just now"),
            Self::Seconds(n) => plural(f, n, "second"),
            Self::Minutes(n) => plural(f, n, "minute"),
            Self::Hours(n) => plural(f, n, "hour"),
            Self::Days(n) => plural(f, n, "day"),
        }
    }
}

/// List-row label: "You" for the viewer's own entry.
pub fn entry_label<'a>(
    identity: &Identity,
    label: &'a str,
    viewer: Option<&Identity>,
) -> &'a str {
    if viewer == Some(identity) { "You" } else { label }
}

/// Header line under the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSummary {
    /// Staff with a known position.
    pub active: usize,
    /// Reporting interval in whole minutes.
    pub interval_minutes: u64,
}

impl ActiveSummary {
    pub fn new(active: usize, report_interval_seconds: u64) -> Self {
        Self {
            active,
            interval_minutes: (report_interval_seconds / MINUTE).max(1),
        }
    }
}

impl fmt::Display for ActiveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} staff active • updated every {} minutes",
            self.active, self.interval_minutes
        )
    }
}
