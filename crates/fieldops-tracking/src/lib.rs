//! # fieldops-tracking
//!
//! Field-staff location tracking for FieldOps. Provides:
//!
//! - A location reporter that keeps the device's presence record fresh on
//!   a fixed schedule and on every foreground activation
//! - A presence directory: a live, filtered view of every staff member
//!   with a known position
//! - Selection and derived view logic (map focus, "time since" labels)
//! - A pure map renderer with marker-set diffing
//! - A screen orchestrator that owns one mount/unmount lifetime

pub mod directory;
pub mod geolocation;
pub mod handle;
pub mod lifecycle;
pub mod map;
pub mod reporter;
pub mod screen;
pub mod selection;
pub mod session;
pub mod view;

pub use directory::PresenceDirectory;
pub use geolocation::ConfiguredGeolocation;
pub use handle::TaskHandle;
pub use lifecycle::{LifecycleSignal, LifecycleTransition};
pub use map::{MapDocument, MapView, MarkerDiff, render_map};
pub use reporter::{InitError, InitStage, LocationReporter};
pub use screen::{ScreenStatus, TrackingDeps, TrackingScreen};
pub use selection::SelectionState;
pub use session::SessionIdentity;
pub use view::{ActiveSummary, RenderTarget, TimeAgo, render_target, time_ago};
