//! Incoming follow requests: the pending-count badge and the approve/reject actions.
//!
//! The count is refreshed on a fixed interval as a freshness floor, and
//! immediately whenever a [`RefreshSignal`] fires. Approve/reject fire the
//! signal as soon as the graph confirms, so the badge never waits out a full
//! interval after a direct action. A signal fired while a fetch is running is
//! kept and triggers one more fetch.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use doro_protocol::FollowRequest;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::{DoroError, Result};

use super::graph::SocialGraph;

/// Cloneable handle that asks the monitor to refetch now.
#[derive(Debug, Clone, Default)]
pub struct RefreshSignal(Arc<Notify>);

impl RefreshSignal {
    pub fn refresh_now(&self) {
        self.0.notify_one();
    }

    async fn fired(&self) {
        self.0.notified().await;
    }
}

pub struct PendingRequestMonitor {
    graph: Arc<dyn SocialGraph>,
    viewer: String,
    interval: Duration,
    signal: RefreshSignal,
    count: watch::Sender<u32>,
}

impl PendingRequestMonitor {
    pub fn new(graph: Arc<dyn SocialGraph>, viewer: &str, interval: Duration) -> Self {
        let (count, _rx) = watch::channel(0);
        Self {
            graph,
            viewer: viewer.to_string(),
            interval,
            signal: RefreshSignal::default(),
            count,
        }
    }

    pub fn signal(&self) -> RefreshSignal {
        self.signal.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.count.subscribe()
    }

    pub fn count(&self) -> u32 {
        *self.count.borrow()
    }

    /// One fetch. On failure the last known count stays displayed.
    pub async fn refresh(&self) -> Option<u32> {
        match self.graph.pending_request_count(&self.viewer).await {
            Ok(count) => {
                self.count.send_replace(count);
                Some(count)
            }
            Err(err) => {
                tracing::warn!(viewer = %self.viewer, error = %err, "Pending request count failed");
                None
            }
        }
    }

    /// Runs until the handle is aborted: fetch now, then on every interval tick
    /// or signal, whichever comes first.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = self.signal.fired() => {
                        tracing::debug!(viewer = %self.viewer, "Pending request count refresh signalled");
                    }
                }
                self.refresh().await;
            }
        })
    }
}

/// The viewer's inbox of requests awaiting approval.
pub struct IncomingRequests {
    graph: Arc<dyn SocialGraph>,
    viewer: String,
    signal: RefreshSignal,
    requests: Mutex<Vec<FollowRequest>>,
}

impl IncomingRequests {
    pub fn new(graph: Arc<dyn SocialGraph>, viewer: &str, signal: RefreshSignal) -> Self {
        Self {
            graph,
            viewer: viewer.to_string(),
            signal,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<FollowRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub async fn load(&self) -> Result<Vec<FollowRequest>> {
        let requests = self
            .graph
            .incoming_requests(&self.viewer)
            .await
            .map_err(|err| DoroError::service("load follow requests", err))?;
        *self.requests.lock().unwrap_or_else(|e| e.into_inner()) = requests.clone();
        Ok(requests)
    }

    pub async fn approve(&self, request_id: &str) -> Result<()> {
        self.graph
            .approve_request(&self.viewer, request_id)
            .await
            .map_err(|err| self.failed("approve follow request", request_id, err))?;
        self.resolved(request_id);
        Ok(())
    }

    pub async fn reject(&self, request_id: &str) -> Result<()> {
        self.graph
            .reject_request(&self.viewer, request_id)
            .await
            .map_err(|err| self.failed("reject follow request", request_id, err))?;
        self.resolved(request_id);
        Ok(())
    }

    fn resolved(&self, request_id: &str) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|request| request.id != request_id);
        self.signal.refresh_now();
    }

    fn failed(
        &self,
        operation: &'static str,
        request_id: &str,
        err: crate::error::ServiceError,
    ) -> DoroError {
        tracing::warn!(viewer = %self.viewer, request_id, operation, error = %err, "Request action failed");
        DoroError::service(operation, err)
    }
}
