//! Session binding: the current principal, shared by the cache and the form.

use std::sync::Arc;

use tokio::sync::watch;

use super::PrincipalId;

/// Cloneable handle to the signed-in principal.
///
/// Every clone observes the same state. Created signed out; `sign_in` and
/// `sign_out` drive the lifecycle.
#[derive(Debug, Clone)]
pub struct Session {
    sender: Arc<watch::Sender<Option<PrincipalId>>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a signed-out session.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Creates a session already signed in as `principal`.
    pub fn signed_in(principal: impl Into<PrincipalId>) -> Self {
        let session = Self::new();
        session.sign_in(principal);
        session
    }

    /// Returns the current principal, if any.
    pub fn principal(&self) -> Option<PrincipalId> {
        self.sender.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.sender.borrow().is_some()
    }

    pub fn sign_in(&self, principal: impl Into<PrincipalId>) {
        let principal = principal.into();
        tracing::debug!(%principal, "Principal signed in");
        self.sender.send_replace(Some(principal));
    }

    pub fn sign_out(&self) {
        if let Some(previous) = self.sender.send_replace(None) {
            tracing::debug!(principal = %previous, "Principal signed out");
        }
    }

    /// Subscribes to principal changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<PrincipalId>> {
        self.sender.subscribe()
    }
}
