//! Application foreground/background state.

use serde::{Deserialize, Serialize};

/// The app's visibility state as reported by the OS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppLifecycle {
    /// In the foreground and interactive.
    #[default]
    Active,
    /// Visible but not receiving input (transitional).
    Inactive,
    /// Moved to the background.
    Background,
}

impl AppLifecycle {
    /// Whether moving from `self` to `next` is a foreground activation.
    pub fn is_activation(self, next: AppLifecycle) -> bool {
        self != Self::Active && next == Self::Active
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Background => "background",
        }
    }
}
