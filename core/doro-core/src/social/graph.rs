use async_trait::async_trait;
use doro_protocol::{BlockStatus, FollowRequest};

use crate::error::ServiceResult;

/// Remote social graph. Every call is one round-trip; ids are opaque user ids.
#[async_trait]
pub trait SocialGraph: Send + Sync {
    async fn is_following(&self, viewer: &str, target: &str) -> ServiceResult<bool>;

    async fn create_follow_edge(&self, viewer: &str, target: &str) -> ServiceResult<()>;

    async fn remove_follow_edge(&self, viewer: &str, target: &str) -> ServiceResult<()>;

    async fn pending_request(
        &self,
        viewer: &str,
        target: &str,
    ) -> ServiceResult<Option<FollowRequest>>;

    async fn create_follow_request(&self, viewer: &str, target: &str) -> ServiceResult<()>;

    async fn cancel_follow_request(&self, viewer: &str, target: &str) -> ServiceResult<()>;

    async fn block_status(&self, viewer: &str, target: &str) -> ServiceResult<BlockStatus>;

    /// Property of the target account, not of the edge.
    async fn requires_approval(&self, target: &str) -> ServiceResult<bool>;

    async fn block_user(&self, viewer: &str, target: &str) -> ServiceResult<()>;

    /// Requests awaiting the viewer's decision.
    async fn pending_request_count(&self, viewer: &str) -> ServiceResult<u32>;

    async fn incoming_requests(&self, viewer: &str) -> ServiceResult<Vec<FollowRequest>>;

    async fn approve_request(&self, viewer: &str, request_id: &str) -> ServiceResult<()>;

    async fn reject_request(&self, viewer: &str, request_id: &str) -> ServiceResult<()>;
}
