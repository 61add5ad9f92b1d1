//! Signed-in identity held for the app session.

use tokio::sync::watch;
use tracing::info;

use fieldops_core::traits::IdentityProvider;
use fieldops_core::types::Identity;

/// Holds the signed-in identity and lets observers follow sign-in/out.
#[derive(Debug)]
pub struct SessionIdentity {
    current: watch::Sender<Option<Identity>>,
}

impl SessionIdentity {
    /// A session with nobody signed in.
    pub fn signed_out() -> Self {
        Self {
            current: watch::Sender::new(None),
        }
    }

    /// A session already signed in as `identity`.
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            current: watch::Sender::new(Some(identity)),
        }
    }

    /// Record a successful sign-in.
    pub fn sign_in(&self, identity: Identity) {
        info!(identity = %identity, "Signed in");
        self.current.send_replace(Some(identity));
    }

    /// Clear the session.
    pub fn sign_out(&self) {
        if let Some(previous) = self.current.send_replace(None) {
            info!(identity = %previous, "Signed out");
        }
    }

    /// Follow identity changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self::signed_out()
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_identity(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }
}
