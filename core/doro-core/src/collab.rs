//! Narrow interfaces to the collaborators the core treats as black boxes:
//! the identity provider and session persistence. The social graph and
//! leaderboard store live beside their consumers in [`crate::social`] and
//! [`crate::leaderboard`].

use async_trait::async_trait;
use doro_protocol::{PublishSessionRequest, Viewer};
use tokio::sync::watch;

use crate::error::ServiceResult;

/// Source of the authenticated viewer, with change notification.
pub trait IdentityProvider: Send + Sync {
    fn current_viewer(&self) -> Option<Viewer>;

    /// Receives a new value on every sign-in, sign-out or account switch.
    fn subscribe(&self) -> watch::Receiver<Option<Viewer>>;
}

/// Identity provider backed by a watch channel; the host pushes changes with
/// [`WatchIdentity::set_viewer`].
#[derive(Debug)]
pub struct WatchIdentity {
    tx: watch::Sender<Option<Viewer>>,
}

impl WatchIdentity {
    pub fn new(viewer: Option<Viewer>) -> Self {
        let (tx, _rx) = watch::channel(viewer);
        Self { tx }
    }

    pub fn set_viewer(&self, viewer: Option<Viewer>) {
        self.tx.send_replace(viewer);
    }
}

impl IdentityProvider for WatchIdentity {
    fn current_viewer(&self) -> Option<Viewer> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Viewer>> {
        self.tx.subscribe()
    }
}

/// Remote store for completed sessions.
#[async_trait]
pub trait SessionPersistence: Send + Sync {
    async fn publish_session(&self, request: &PublishSessionRequest) -> ServiceResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer(id: &str) -> Viewer {
        Viewer {
            id: id.to_string(),
            display_name: id.to_uppercase(),
            avatar_ref: None,
        }
    }

    #[test]
    fn watch_identity_notifies_subscribers() {
        let identity = WatchIdentity::new(Some(viewer("a")));
        let mut rx = identity.subscribe();
        assert_eq!(identity.current_viewer(), Some(viewer("a")));

        identity.set_viewer(Some(viewer("b")));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().clone(), Some(viewer("b")));

        identity.set_viewer(None);
        assert_eq!(identity.current_viewer(), None);
    }
}
