//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use doro_core::social::fake::FakeGraph;
use doro_core::{
    Collaborators, LeaderboardStore, ServiceError, ServiceResult, SessionPersistence,
    WatchIdentity,
};
use doro_protocol::{
    FriendProfile, FriendWeeklyRow, GlobalWeeklyRow, PublishSessionRequest, Viewer,
};
use tokio::sync::Semaphore;

pub fn viewer(id: &str) -> Viewer {
    Viewer {
        id: id.to_string(),
        display_name: id.to_uppercase(),
        avatar_ref: None,
    }
}

/// Monday 2026-01-05 09:00 UTC.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Leaderboard store
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryLeaderboard {
    global: Mutex<Vec<GlobalWeeklyRow>>,
    friends: Mutex<HashMap<String, Vec<FriendWeeklyRow>>>,
    calls: Mutex<Vec<String>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl InMemoryLeaderboard {
    pub fn set_global(&self, rows: &[(&str, i64)]) {
        *self.global.lock().unwrap() = rows
            .iter()
            .map(|(id, count)| GlobalWeeklyRow {
                user_id: id.to_string(),
                username: id.to_string(),
                display_name: Some(id.to_uppercase()),
                avatar_url: None,
                weekly_count: *count,
            })
            .collect();
    }

    pub fn set_friends(&self, viewer: &str, rows: &[(&str, i64)]) {
        let rows = rows
            .iter()
            .map(|(id, count)| FriendWeeklyRow {
                friend: FriendProfile {
                    id: id.to_string(),
                    username: id.to_string(),
                    full_name: Some(id.to_uppercase()),
                    avatar_path: None,
                },
                doro_count: *count,
            })
            .collect();
        self.friends.lock().unwrap().insert(viewer.to_string(), rows);
    }

    /// Fetches wait for permits on the returned semaphore.
    pub fn hold(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self, scope: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == scope)
            .count()
    }

    async fn enter(&self, scope: &str) {
        self.calls.lock().unwrap().push(scope.to_string());
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

#[async_trait]
impl LeaderboardStore for InMemoryLeaderboard {
    async fn global_weekly(&self, _viewer_id: Option<&str>) -> ServiceResult<Vec<GlobalWeeklyRow>> {
        self.enter("global").await;
        Ok(self.global.lock().unwrap().clone())
    }

    async fn friends_weekly(&self, viewer_id: &str) -> ServiceResult<Vec<FriendWeeklyRow>> {
        self.enter("friends").await;
        Ok(self
            .friends
            .lock()
            .unwrap()
            .get(viewer_id)
            .cloned()
            .unwrap_or_default())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session persistence
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingPersistence {
    published: Mutex<Vec<PublishSessionRequest>>,
    fail_next: AtomicBool,
}

impl RecordingPersistence {
    pub fn published(&self) -> Vec<PublishSessionRequest> {
        self.published.lock().unwrap().clone()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionPersistence for RecordingPersistence {
    async fn publish_session(&self, request: &PublishSessionRequest) -> ServiceResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ServiceError::Transport("connection reset".to_string()));
        }
        self.published.lock().unwrap().push(request.clone());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wiring
// ─────────────────────────────────────────────────────────────────────────────

pub struct World {
    pub identity: Arc<WatchIdentity>,
    pub graph: Arc<FakeGraph>,
    pub leaderboard: Arc<InMemoryLeaderboard>,
    pub persistence: Arc<RecordingPersistence>,
}

impl World {
    pub fn signed_in(id: &str) -> Self {
        Self {
            identity: Arc::new(WatchIdentity::new(Some(viewer(id)))),
            graph: Arc::new(FakeGraph::default()),
            leaderboard: Arc::new(InMemoryLeaderboard::default()),
            persistence: Arc::new(RecordingPersistence::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            identity: self.identity.clone(),
            graph: self.graph.clone(),
            leaderboard: self.leaderboard.clone(),
            persistence: self.persistence.clone(),
        }
    }
}
