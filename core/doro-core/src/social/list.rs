//! Followers/following lists: the parent of per-row follow controls.
//!
//! Blocking from a list removes the row at once, which is how the row's follow
//! control disappears without a reload; rows never poll their own block status.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::{DoroError, Result};

use super::edge::FollowControl;
use super::graph::SocialGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Followers,
    Following,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedUser {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

pub struct FollowList {
    graph: Arc<dyn SocialGraph>,
    viewer: String,
    kind: ListKind,
    rows: Mutex<Vec<ListedUser>>,
}

impl FollowList {
    pub fn new(
        graph: Arc<dyn SocialGraph>,
        viewer: &str,
        kind: ListKind,
        rows: Vec<ListedUser>,
    ) -> Self {
        Self {
            graph,
            viewer: viewer.to_string(),
            kind,
            rows: Mutex::new(rows),
        }
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn rows(&self) -> Vec<ListedUser> {
        self.lock().clone()
    }

    /// Control for a listed row. Rows of the viewer's own following list are
    /// known edges and render `following` before the load completes.
    pub fn follow_control(&self, user_id: &str) -> Option<FollowControl> {
        let listed = self.lock().iter().any(|row| row.user_id == user_id);
        listed.then(|| {
            FollowControl::new(
                Arc::clone(&self.graph),
                Some(&self.viewer),
                user_id,
                self.kind == ListKind::Following,
            )
        })
    }

    /// Blocks `user_id` and drops its row once the graph confirms.
    pub async fn block(&self, user_id: &str) -> Result<()> {
        self.graph
            .block_user(&self.viewer, user_id)
            .await
            .map_err(|err| {
                tracing::warn!(viewer = %self.viewer, blocked = %user_id, error = %err, "Block failed");
                DoroError::service("block user", err)
            })?;
        self.lock().retain(|row| row.user_id != user_id);
        tracing::info!(viewer = %self.viewer, blocked = %user_id, "User blocked; row removed");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ListedUser>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }
}
