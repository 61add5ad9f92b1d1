//! Identity provider trait for the signed-in session.

use crate::types::identity::Identity;

/// Answers "who is signed in right now".
///
/// `None` is an expected transient state (e.g. mid sign-out), not an error.
pub trait IdentityProvider: Send + Sync + std::fmt::Debug + 'static {
    /// The signed-in identity, if any.
    fn current_identity(&self) -> Option<Identity>;
}
