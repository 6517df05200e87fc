//! Recording, gateable social graph for tests. Built with `cfg(test)` or the
//! `test-support` feature.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use doro_protocol::{BlockStatus, ErrorInfo, FollowRequest};
use tokio::sync::Semaphore;

use crate::error::{ServiceError, ServiceResult};

use super::graph::SocialGraph;

type Pair = (String, String);

fn pair(a: &str, b: &str) -> Pair {
    (a.to_string(), b.to_string())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Default)]
pub struct FakeGraph {
    follows: Mutex<HashSet<Pair>>,
    requests: Mutex<HashSet<Pair>>,
    blocks: Mutex<HashSet<Pair>>,
    approval: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    fail: Mutex<Option<&'static str>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    waiting: AtomicUsize,
}

impl FakeGraph {
    pub fn add_follow(&self, viewer: &str, target: &str) {
        lock(&self.follows).insert(pair(viewer, target));
    }

    pub fn add_request(&self, viewer: &str, target: &str) {
        lock(&self.requests).insert(pair(viewer, target));
    }

    pub fn add_block(&self, blocker: &str, blocked: &str) {
        lock(&self.blocks).insert(pair(blocker, blocked));
    }

    pub fn require_approval(&self, target: &str) {
        lock(&self.approval).insert(target.to_string());
    }

    pub fn is_following_now(&self, viewer: &str, target: &str) -> bool {
        lock(&self.follows).contains(&pair(viewer, target))
    }

    pub fn has_request(&self, viewer: &str, target: &str) -> bool {
        lock(&self.requests).contains(&pair(viewer, target))
    }

    pub fn fail_next(&self, method: &'static str) {
        *lock(&self.fail) = Some(method);
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|c| *c == method).count()
    }

    pub fn mutations(&self) -> Vec<String> {
        const MUTATIONS: [&str; 7] = [
            "create_follow_edge",
            "remove_follow_edge",
            "create_follow_request",
            "cancel_follow_request",
            "block_user",
            "approve_request",
            "reject_request",
        ];
        self.calls()
            .into_iter()
            .filter(|c| MUTATIONS.contains(&c.as_str()))
            .collect()
    }

    /// Mutations wait for a permit from the returned semaphore.
    pub fn hold_mutations(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *lock(&self.gate) = Some(Arc::clone(&gate));
        gate
    }

    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    fn record(&self, method: &'static str) -> ServiceResult<()> {
        lock(&self.calls).push(method.to_string());
        let mut fail = lock(&self.fail);
        if *fail == Some(method) {
            *fail = None;
            return Err(ServiceError::Transport(format!("{} unavailable", method)));
        }
        Ok(())
    }

    async fn mutate(&self, method: &'static str) -> ServiceResult<()> {
        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
            self.waiting.fetch_sub(1, Ordering::SeqCst);
        }
        self.record(method)
    }
}

#[async_trait]
impl SocialGraph for FakeGraph {
    async fn is_following(&self, viewer: &str, target: &str) -> ServiceResult<bool> {
        self.record("is_following")?;
        Ok(lock(&self.follows).contains(&pair(viewer, target)))
    }

    async fn create_follow_edge(&self, viewer: &str, target: &str) -> ServiceResult<()> {
        self.mutate("create_follow_edge").await?;
        lock(&self.follows).insert(pair(viewer, target));
        Ok(())
    }

    async fn remove_follow_edge(&self, viewer: &str, target: &str) -> ServiceResult<()> {
        self.mutate("remove_follow_edge").await?;
        lock(&self.follows).remove(&pair(viewer, target));
        Ok(())
    }

    async fn pending_request(
        &self,
        viewer: &str,
        target: &str,
    ) -> ServiceResult<Option<FollowRequest>> {
        self.record("pending_request")?;
        let exists = lock(&self.requests).contains(&pair(viewer, target));
        Ok(exists.then(|| FollowRequest {
            id: format!("{}->{}", viewer, target),
            requester_id: viewer.to_string(),
            target_id: target.to_string(),
            created_at: "2026-01-05T09:00:00Z".to_string(),
        }))
    }

    async fn create_follow_request(&self, viewer: &str, target: &str) -> ServiceResult<()> {
        self.mutate("create_follow_request").await?;
        lock(&self.requests).insert(pair(viewer, target));
        Ok(())
    }

    async fn cancel_follow_request(&self, viewer: &str, target: &str) -> ServiceResult<()> {
        self.mutate("cancel_follow_request").await?;
        lock(&self.requests).remove(&pair(viewer, target));
        Ok(())
    }

    async fn block_status(&self, viewer: &str, target: &str) -> ServiceResult<BlockStatus> {
        self.record("block_status")?;
        let blocks = lock(&self.blocks);
        Ok(BlockStatus {
            viewer_blocked_target: blocks.contains(&pair(viewer, target)),
            target_blocked_viewer: blocks.contains(&pair(target, viewer)),
        })
    }

    async fn requires_approval(&self, target: &str) -> ServiceResult<bool> {
        self.record("requires_approval")?;
        Ok(lock(&self.approval).contains(target))
    }

    async fn block_user(&self, viewer: &str, target: &str) -> ServiceResult<()> {
        self.mutate("block_user").await?;
        self.add_block(viewer, target);
        Ok(())
    }

    async fn pending_request_count(&self, viewer: &str) -> ServiceResult<u32> {
        self.record("pending_request_count")?;
        let count = lock(&self.requests)
            .iter()
            .filter(|(_, target)| target == viewer)
            .count();
        Ok(count as u32)
    }

    async fn incoming_requests(&self, viewer: &str) -> ServiceResult<Vec<FollowRequest>> {
        self.record("incoming_requests")?;
        let mut requests: Vec<FollowRequest> = lock(&self.requests)
            .iter()
            .filter(|(_, target)| target == viewer)
            .map(|(requester, target)| FollowRequest {
                id: format!("{}->{}", requester, target),
                requester_id: requester.clone(),
                target_id: target.clone(),
                created_at: "2026-01-05T09:00:00Z".to_string(),
            })
            .collect();
        requests.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(requests)
    }

    async fn approve_request(&self, viewer: &str, request_id: &str) -> ServiceResult<()> {
        self.mutate("approve_request").await?;
        let (requester, _) = request_id.split_once("->").ok_or_else(|| {
            ServiceError::Rejected(ErrorInfo::new("not_found", "unknown request"))
        })?;
        lock(&self.requests).remove(&pair(requester, viewer));
        self.add_follow(requester, viewer);
        Ok(())
    }

    async fn reject_request(&self, viewer: &str, request_id: &str) -> ServiceResult<()> {
        self.mutate("reject_request").await?;
        let (requester, _) = request_id.split_once("->").ok_or_else(|| {
            ServiceError::Rejected(ErrorInfo::new("not_found", "unknown request"))
        })?;
        lock(&self.requests).remove(&pair(requester, viewer));
        Ok(())
    }
}
