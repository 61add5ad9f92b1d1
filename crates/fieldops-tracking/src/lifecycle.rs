//! App foreground/background signal.

use tokio::sync::{broadcast, watch};
use tracing::debug;

use fieldops_core::types::AppLifecycle;

/// Transitions buffered per receiver before it lags.
const TRANSITION_BUFFER: usize = 32;

/// One observed change of lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTransition {
    pub from: AppLifecycle,
    pub to: AppLifecycle,
}

impl LifecycleTransition {
    /// Whether this transition brings the app to the foreground.
    pub fn is_activation(&self) -> bool {
        self.from.is_activation(self.to)
    }
}

/// Publishes the app's lifecycle transitions to the reporter.
///
/// Every change is delivered to each receiver in order, so a quick
/// background and foreground flip still reaches the reporter as an
/// activation.
#[derive(Debug)]
pub struct LifecycleSignal {
    state: watch::Sender<AppLifecycle>,
    transitions: broadcast::Sender<LifecycleTransition>,
}

impl LifecycleSignal {
    /// Start in `initial`.
    pub fn new(initial: AppLifecycle) -> Self {
        let (transitions, _) = broadcast::channel(TRANSITION_BUFFER);
        Self {
            state: watch::Sender::new(initial),
            transitions,
        }
    }

    /// Report a new state. Repeating the current state notifies nobody.
    pub fn set(&self, state: AppLifecycle) {
        self.state.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            let transition = LifecycleTransition {
                from: *current,
                to: state,
            };
            *current = state;
            // No receiver yet is fine.
            let _ = self.transitions.send(transition);
            debug!(
                from = transition.from.as_str(),
                to = transition.to.as_str(),
                "App lifecycle changed"
            );
            true
        });
    }

    /// Current state.
    pub fn current(&self) -> AppLifecycle {
        *self.state.borrow()
    }

    /// Receiver handed to the reporter. It sees every transition made
    /// after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleTransition> {
        self.transitions.subscribe()
    }
}

impl Default for LifecycleSignal {
    fn default() -> Self {
        Self::new(AppLifecycle::Active)
    }
}
