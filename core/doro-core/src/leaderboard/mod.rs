//! Weekly leaderboards for two scopes (global and the viewer's friends).
//!
//! ```text
//! identity change ─┐
//! publish ─▶ invalidate ─▶ LeaderboardCache ─▶ LeaderboardStore (global ∥ friends)
//!                                │
//!                                ▼
//!                      LeaderboardView (watch)
//! ```
//!
//! Both scopes are normalized to [`LeaderboardEntry`](doro_protocol::LeaderboardEntry)
//! before they reach the cache, so consumers never branch on scope.

mod cache;
mod week;

use async_trait::async_trait;
use doro_protocol::{FriendWeeklyRow, GlobalWeeklyRow};

use crate::error::ServiceResult;

pub use cache::{rank, LeaderboardCache, LeaderboardSlot, LeaderboardView, RefreshOutcome};
pub use week::WeekWindow;

/// Remote weekly aggregations. Rows come back in their scope-specific shapes.
#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    async fn global_weekly(&self, viewer_id: Option<&str>) -> ServiceResult<Vec<GlobalWeeklyRow>>;

    async fn friends_weekly(&self, viewer_id: &str) -> ServiceResult<Vec<FriendWeeklyRow>>;
}

/// Receiver of "standings are stale" signals from flows that change them.
/// Publishing awaits `invalidate`, so implementations only record the signal
/// and must not wait on a refetch.
#[async_trait]
pub trait LeaderboardInvalidator: Send + Sync {
    async fn invalidate(&self);
}
