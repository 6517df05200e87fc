//! Follow/request/block state for one (viewer, target) pair.
//!
//! ```text
//! state          approval  toggle() calls            result
//! not-following  required  create_follow_request  →  requested
//! not-following  no        create_follow_edge     →  following
//! following      -         remove_follow_edge     →  not-following
//! requested      -         cancel_follow_request  →  not-following
//! ```
//!
//! `state` only moves on an authoritative read or a server-confirmed mutation.
//! A failed mutation leaves the displayed state where it was and records the
//! error inline; nothing is rolled back because nothing was applied.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::error::{DoroError, Result};

use super::graph::SocialGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FollowState {
    NotFollowing,
    Following,
    Requested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialEdge {
    pub state: FollowState,
    /// Cached for the control's lifetime once fetched.
    pub requires_approval: Option<bool>,
    pub blocked_either_direction: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowControlView {
    /// When false the control is absent, not disabled.
    pub visible: bool,
    pub state: FollowState,
    pub disabled: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Applied(FollowState),
    /// A previous toggle or the initial load is still in flight.
    Busy,
    /// Viewer is the target, anonymous, or a block exists.
    Hidden,
}

#[derive(Debug)]
struct Inner {
    edge: SocialEdge,
    loading: bool,
    busy: bool,
    last_error: Option<String>,
}

pub struct FollowControl {
    graph: Arc<dyn SocialGraph>,
    viewer: Option<String>,
    target: String,
    inner: Mutex<Inner>,
}

impl FollowControl {
    /// Renders immediately: `following` when the caller already knows the
    /// viewer follows the target, `not-following` otherwise. Call
    /// [`load`](Self::load) to fetch the authoritative relationship.
    pub fn new(
        graph: Arc<dyn SocialGraph>,
        viewer: Option<&str>,
        target: &str,
        known_following: bool,
    ) -> Self {
        let state = if known_following {
            FollowState::Following
        } else {
            FollowState::NotFollowing
        };
        Self {
            graph,
            viewer: viewer.map(str::to_owned),
            target: target.to_string(),
            inner: Mutex::new(Inner {
                edge: SocialEdge {
                    state,
                    requires_approval: None,
                    blocked_either_direction: false,
                },
                loading: true,
                busy: false,
                last_error: None,
            }),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn edge(&self) -> SocialEdge {
        self.lock().edge.clone()
    }

    pub fn state(&self) -> FollowState {
        self.lock().edge.state
    }

    pub fn is_visible(&self) -> bool {
        let blocked = self.lock().edge.blocked_either_direction;
        self.acting_viewer().is_some() && !blocked
    }

    pub fn view(&self) -> FollowControlView {
        let visible = self.is_visible();
        let inner = self.lock();
        FollowControlView {
            visible,
            state: inner.edge.state,
            disabled: inner.loading || inner.busy,
            last_error: inner.last_error.clone(),
        }
    }

    /// Issues the authoritative reads concurrently and applies them.
    pub async fn load(&self) -> SocialEdge {
        let Some(viewer) = self.acting_viewer() else {
            self.lock().loading = false;
            return self.edge();
        };
        let (hinted, cached_approval) = {
            let inner = self.lock();
            (
                inner.edge.state == FollowState::Following,
                inner.edge.requires_approval,
            )
        };
        let target = self.target.as_str();
        let graph = self.graph.as_ref();

        let following = async {
            if hinted {
                Ok(true)
            } else {
                graph.is_following(viewer, target).await
            }
        };
        let approval = async {
            match cached_approval {
                Some(value) => Ok(value),
                None => graph.requires_approval(target).await,
            }
        };
        let (following, pending, blocks, approval) = tokio::join!(
            following,
            graph.pending_request(viewer, target),
            graph.block_status(viewer, target),
            approval,
        );

        let mut inner = self.lock();
        let following = following.unwrap_or_else(|err| {
            tracing::warn!(target_user = %target, error = %err, "Follow check failed");
            inner.edge.state == FollowState::Following
        });
        let pending = pending.map(|request| request.is_some()).unwrap_or_else(|err| {
            tracing::warn!(target_user = %target, error = %err, "Pending request check failed");
            false
        });
        match blocks {
            Ok(status) => inner.edge.blocked_either_direction = status.either(),
            Err(err) => tracing::warn!(target_user = %target, error = %err, "Block check failed"),
        }
        match approval {
            Ok(value) => inner.edge.requires_approval = Some(value),
            Err(err) => tracing::warn!(target_user = %target, error = %err, "Approval check failed"),
        }

        // An unresolved request outranks a direct edge.
        inner.edge.state = if pending {
            FollowState::Requested
        } else if following {
            FollowState::Following
        } else {
            FollowState::NotFollowing
        };
        inner.loading = false;
        inner.edge.clone()
    }

    /// Re-reads block status; returns whether the control is still visible.
    pub async fn refresh_block_status(&self) -> bool {
        let Some(viewer) = self.acting_viewer() else {
            return false;
        };
        match self.graph.block_status(viewer, &self.target).await {
            Ok(status) => self.lock().edge.blocked_either_direction = status.either(),
            Err(err) => {
                tracing::warn!(target_user = %self.target, error = %err, "Block check failed")
            }
        }
        self.is_visible()
    }

    pub async fn toggle(&self) -> Result<ToggleOutcome> {
        let Some(viewer) = self.acting_viewer() else {
            return Ok(ToggleOutcome::Hidden);
        };
        let (state, cached_approval) = {
            let mut inner = self.lock();
            if inner.edge.blocked_either_direction {
                return Ok(ToggleOutcome::Hidden);
            }
            if inner.busy || inner.loading {
                return Ok(ToggleOutcome::Busy);
            }
            inner.busy = true;
            (inner.edge.state, inner.edge.requires_approval)
        };
        let _busy = BusyGuard(&self.inner);
        let target = self.target.as_str();

        let result = match state {
            FollowState::NotFollowing => {
                let approval = match cached_approval {
                    Some(value) => Ok(value),
                    None => self.graph.requires_approval(target).await.map(|value| {
                        self.lock().edge.requires_approval = Some(value);
                        value
                    }),
                };
                match approval {
                    Ok(true) => self
                        .graph
                        .create_follow_request(viewer, target)
                        .await
                        .map(|()| FollowState::Requested)
                        .map_err(|e| ("create follow request", e)),
                    Ok(false) => self
                        .graph
                        .create_follow_edge(viewer, target)
                        .await
                        .map(|()| FollowState::Following)
                        .map_err(|e| ("follow", e)),
                    Err(e) => Err(("check approval requirement", e)),
                }
            }
            FollowState::Following => self
                .graph
                .remove_follow_edge(viewer, target)
                .await
                .map(|()| FollowState::NotFollowing)
                .map_err(|e| ("unfollow", e)),
            FollowState::Requested => self
                .graph
                .cancel_follow_request(viewer, target)
                .await
                .map(|()| FollowState::NotFollowing)
                .map_err(|e| ("cancel follow request", e)),
        };

        let mut inner = self.lock();
        match result {
            Ok(next) => {
                tracing::debug!(target_user = %target, from = ?state, to = ?next, "Follow toggled");
                inner.edge.state = next;
                inner.last_error = None;
                Ok(ToggleOutcome::Applied(next))
            }
            Err((operation, err)) => {
                tracing::warn!(target_user = %target, operation, error = %err, "Follow toggle failed");
                inner.last_error = Some(err.to_string());
                Err(DoroError::service(operation, err))
            }
        }
    }

    /// The viewer id when a control may be shown at all.
    fn acting_viewer(&self) -> Option<&str> {
        self.viewer
            .as_deref()
            .filter(|viewer| *viewer != self.target.as_str())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Re-enables the control however the toggle future ends.
struct BusyGuard<'a>(&'a Mutex<Inner>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).busy = false;
    }
}
