//! Two-scope weekly leaderboard cache.
//!
//! At most one fetch runs per cache at a time. A refresh for the identity the
//! cache already holds data for is a no-op; a refresh for a different identity
//! always proceeds and clears the visible entries before its fetch resolves.
//! Every fetch carries the generation it was issued under, and responses from
//! an older generation are dropped. A refresh dropped mid-fetch releases the
//! cache so the next one fetches again.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use doro_protocol::{FriendWeeklyRow, GlobalWeeklyRow, LeaderboardEntry, Viewer};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::error::ServiceResult;

use super::week::WeekWindow;
use super::{LeaderboardInvalidator, LeaderboardStore};

type Fetched = ServiceResult<Vec<LeaderboardEntry>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardSlot {
    pub entries: Vec<LeaderboardEntry>,
    pub loading: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardView {
    /// Identity the entries belong to; `None` for the anonymous viewer.
    pub viewer_id: Option<String>,
    pub global: LeaderboardSlot,
    pub friends: LeaderboardSlot,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Both scopes were requested and the results applied.
    Fetched,
    /// Another fetch was already running; this request joined it.
    Coalesced,
    /// Data for this identity and week is already present.
    Fresh,
    /// The identity changed while this fetch was running; results dropped.
    Superseded,
}

#[derive(Debug, Default)]
struct CacheInner {
    /// Identity of the last refresh. Outer `None` until the first one.
    identity: Option<Option<String>>,
    has_data: bool,
    week: Option<WeekWindow>,
    in_flight: bool,
    rerun: bool,
    generation: u64,
}

impl CacheInner {
    fn signed_in(&self) -> bool {
        matches!(self.identity, Some(Some(_)))
    }
}

enum Admission {
    Fetch { generation: u64, week: WeekWindow },
    Skip(RefreshOutcome),
}

pub struct LeaderboardCache {
    store: Arc<dyn LeaderboardStore>,
    clock: Arc<dyn Clock>,
    limit: usize,
    inner: Mutex<CacheInner>,
    view: watch::Sender<LeaderboardView>,
}

impl LeaderboardCache {
    pub fn new(store: Arc<dyn LeaderboardStore>, clock: Arc<dyn Clock>, limit: usize) -> Self {
        let (view, _rx) = watch::channel(LeaderboardView::default());
        Self {
            store,
            clock,
            limit,
            inner: Mutex::new(CacheInner::default()),
            view,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LeaderboardView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> LeaderboardView {
        self.view.borrow().clone()
    }

    /// Fetches both scopes for `viewer_id` unless a fetch is running or the
    /// data is already current.
    pub async fn refresh(&self, viewer_id: Option<&str>) -> RefreshOutcome {
        let viewer = viewer_id.map(str::to_string);
        let (generation, week) = match self.admit(&viewer) {
            Admission::Fetch { generation, week } => (generation, week),
            Admission::Skip(outcome) => return outcome,
        };

        let mut guard = FetchGuard {
            cache: self,
            generation,
            settled: false,
        };
        loop {
            let (global, friends) = self.fetch(viewer.as_deref()).await;
            if let Some(outcome) = self.settle(generation, week, global, friends) {
                guard.settled = true;
                return outcome;
            }
        }
    }

    /// Marks both scopes stale and refetches them for the last identity. If a
    /// fetch is running, one more fetch follows it instead; `None` is returned
    /// in that case and when no identity has been seen yet.
    pub async fn invalidate_all(&self) -> Option<RefreshOutcome> {
        let viewer = self.mark_stale()?;
        tracing::info!(viewer = ?viewer, "Leaderboard invalidated; refetching both scopes");
        Some(self.refresh(viewer.as_deref()).await)
    }

    /// Invalidator handed to session controllers. It marks the cache stale and
    /// returns at once; the refetch runs on its own task.
    pub fn stale_signal(self: &Arc<Self>) -> Arc<dyn LeaderboardInvalidator> {
        Arc::new(StaleSignal {
            cache: Arc::clone(self),
        })
    }

    /// Refreshes on every identity notification. Each refresh runs on its own
    /// task so a slow fetch never delays noticing the next switch.
    pub fn follow_identity(
        self: Arc<Self>,
        mut identity: watch::Receiver<Option<Viewer>>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let viewer_id = identity.borrow_and_update().as_ref().map(|v| v.id.clone());
                let cache = Arc::clone(&self);
                tokio::spawn(async move {
                    cache.refresh(viewer_id.as_deref()).await;
                });
                if identity.changed().await.is_err() {
                    tracing::debug!("Identity source closed; leaderboard follower stopping");
                    break;
                }
            }
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn admit(&self, viewer: &Option<String>) -> Admission {
        let now = self.clock.now();
        let week = WeekWindow::containing(now);
        let mut inner = self.lock();

        if inner.identity.as_ref() != Some(viewer) {
            inner.identity = Some(viewer.clone());
            inner.generation += 1;
            inner.has_data = false;
            inner.week = None;
            inner.rerun = false;
            tracing::info!(viewer = ?viewer, generation = inner.generation, "Leaderboard identity changed; entries cleared");
            self.view.send_replace(LeaderboardView {
                viewer_id: viewer.clone(),
                global: LeaderboardSlot {
                    entries: Vec::new(),
                    loading: true,
                },
                friends: LeaderboardSlot {
                    entries: Vec::new(),
                    loading: viewer.is_some(),
                },
                last_error: None,
            });
        } else if inner.in_flight {
            tracing::debug!(viewer = ?viewer, "Leaderboard fetch in flight; coalesced");
            return Admission::Skip(RefreshOutcome::Coalesced);
        } else if inner.has_data && inner.week.is_some_and(|w| w.contains(now)) {
            return Admission::Skip(RefreshOutcome::Fresh);
        }

        inner.in_flight = true;
        self.mark_loading(inner.signed_in());
        Admission::Fetch {
            generation: inner.generation,
            week,
        }
    }

    async fn fetch(&self, viewer_id: Option<&str>) -> (Fetched, Fetched) {
        let global = async {
            self.store.global_weekly(viewer_id).await.map(|rows| {
                rank(
                    rows.into_iter().map(GlobalWeeklyRow::into_entry).collect(),
                    self.limit,
                )
            })
        };
        let friends = async {
            match viewer_id {
                Some(viewer_id) => self.store.friends_weekly(viewer_id).await.map(|rows| {
                    rank(
                        rows.into_iter().map(FriendWeeklyRow::into_entry).collect(),
                        self.limit,
                    )
                }),
                None => Ok(Vec::new()),
            }
        };
        tokio::join!(global, friends)
    }

    /// Applies one fetch. Returns `None` when another fetch must follow.
    fn settle(
        &self,
        generation: u64,
        week: WeekWindow,
        global: Fetched,
        friends: Fetched,
    ) -> Option<RefreshOutcome> {
        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!(generation, current = inner.generation, "Dropping leaderboard response for superseded identity");
            return Some(RefreshOutcome::Superseded);
        }

        let complete = global.is_ok() && friends.is_ok();
        self.view.send_modify(|view| {
            let global_err = fill(&mut view.global, global, "global");
            let friends_err = fill(&mut view.friends, friends, "friends");
            view.last_error = global_err.or(friends_err);
        });

        inner.has_data = complete;
        if complete {
            inner.week = Some(week);
        }

        if inner.rerun {
            inner.rerun = false;
            inner.has_data = false;
            self.mark_loading(inner.signed_in());
            tracing::debug!(generation, "Running queued leaderboard fetch");
            return None;
        }

        inner.in_flight = false;
        Some(RefreshOutcome::Fetched)
    }

    /// Returns the identity to refetch for, or `None` when a running fetch
    /// will pick the change up or no identity has been seen yet.
    fn mark_stale(&self) -> Option<Option<String>> {
        let mut inner = self.lock();
        inner.has_data = false;
        if inner.in_flight {
            inner.rerun = true;
            tracing::debug!("Leaderboard invalidated during fetch; queued another");
            return None;
        }
        inner.identity.clone()
    }

    /// Releases a fetch whose refresh was dropped before it settled.
    fn abandon(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation != generation || !inner.in_flight {
            return;
        }
        inner.in_flight = false;
        inner.rerun = false;
        inner.has_data = false;
        tracing::debug!(generation, "Leaderboard fetch abandoned; next refresh refetches");
        self.view.send_modify(|view| {
            view.global.loading = false;
            view.friends.loading = false;
        });
    }

    fn mark_loading(&self, signed_in: bool) {
        self.view.send_modify(|view| {
            view.global.loading = true;
            view.friends.loading = signed_in;
        });
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Clears `in_flight` if the owning refresh is dropped before settling.
struct FetchGuard<'a> {
    cache: &'a LeaderboardCache,
    generation: u64,
    settled: bool,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.cache.abandon(self.generation);
        }
    }
}

struct StaleSignal {
    cache: Arc<LeaderboardCache>,
}

#[async_trait]
impl LeaderboardInvalidator for StaleSignal {
    async fn invalidate(&self) {
        let Some(viewer) = self.cache.mark_stale() else {
            return;
        };
        tracing::info!(viewer = ?viewer, "Leaderboard invalidated; refetching both scopes");
        let cache = Arc::clone(&self.cache);
        tokio::spawn(async move {
            cache.refresh(viewer.as_deref()).await;
        });
    }
}

/// Previous entries stay visible when a scope fails.
fn fill(slot: &mut LeaderboardSlot, result: Fetched, scope: &'static str) -> Option<String> {
    slot.loading = false;
    match result {
        Ok(entries) => {
            slot.entries = entries;
            None
        }
        Err(err) => {
            tracing::warn!(scope, error = %err, "Leaderboard fetch failed; keeping previous entries");
            Some(err.to_string())
        }
    }
}

/// Orders by weekly count (highest first), then display name, then user id;
/// keeps the first row per user and at most `limit` rows.
pub fn rank(mut entries: Vec<LeaderboardEntry>, limit: usize) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| {
        b.completion_count
            .cmp(&a.completion_count)
            .then_with(|| a.display_name.cmp(&b.display_name))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    let mut seen = HashSet::new();
    entries.retain(|entry| seen.insert(entry.user_id.clone()));
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::collab::{IdentityProvider, WatchIdentity};
    use crate::error::ServiceError;
    use chrono::{TimeZone, Utc};
    use doro_protocol::FriendProfile;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Semaphore;

    #[derive(Default)]
    struct FakeStore {
        global: Mutex<Vec<GlobalWeeklyRow>>,
        friends: Mutex<HashMap<String, Vec<FriendWeeklyRow>>>,
        calls: Mutex<Vec<String>>,
        gate: Mutex<Option<Arc<Semaphore>>>,
        fail: AtomicBool,
    }

    impl FakeStore {
        fn set_global(&self, rows: &[(&str, i64)]) {
            *self.global.lock().unwrap() = rows
                .iter()
                .map(|(id, count)| GlobalWeeklyRow {
                    user_id: id.to_string(),
                    username: id.to_string(),
                    display_name: None,
                    avatar_url: None,
                    weekly_count: *count,
                })
                .collect();
        }

        fn set_friends(&self, viewer: &str, rows: &[(&str, i64)]) {
            let rows = rows
                .iter()
                .map(|(id, count)| FriendWeeklyRow {
                    friend: FriendProfile {
                        id: id.to_string(),
                        username: id.to_string(),
                        full_name: None,
                        avatar_path: None,
                    },
                    doro_count: *count,
                })
                .collect();
            self.friends.lock().unwrap().insert(viewer.to_string(), rows);
        }

        fn hold(&self) -> Arc<Semaphore> {
            let gate = Arc::new(Semaphore::new(0));
            *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
            gate
        }

        fn count(&self, prefix: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }

        async fn enter(&self, call: String) -> ServiceResult<()> {
            self.calls.lock().unwrap().push(call);
            let gate = self.gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(ServiceError::Transport("leaderboard offline".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl LeaderboardStore for FakeStore {
        async fn global_weekly(
            &self,
            viewer_id: Option<&str>,
        ) -> ServiceResult<Vec<GlobalWeeklyRow>> {
            self.enter(format!("global:{}", viewer_id.unwrap_or("-")))
                .await?;
            Ok(self.global.lock().unwrap().clone())
        }

        async fn friends_weekly(&self, viewer_id: &str) -> ServiceResult<Vec<FriendWeeklyRow>> {
            self.enter(format!("friends:{}", viewer_id)).await?;
            Ok(self
                .friends
                .lock()
                .unwrap()
                .get(viewer_id)
                .cloned()
                .unwrap_or_default())
        }
    }

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 8, 12, 0, 0).unwrap())
    }

    fn cache(store: &Arc<FakeStore>) -> LeaderboardCache {
        LeaderboardCache::new(store.clone(), Arc::new(clock()), 50)
    }

    fn ids(slot: &LeaderboardSlot) -> Vec<&str> {
        slot.entries.iter().map(|e| e.user_id.as_str()).collect()
    }

    fn entry(id: &str, name: &str, count: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: id.to_string(),
            display_name: name.to_string(),
            avatar_url: None,
            completion_count: count,
        }
    }

    #[test]
    fn rank_orders_dedupes_and_truncates() {
        let ranked = rank(
            vec![
                entry("c", "Cleo", 3),
                entry("a", "Ari", 5),
                entry("b", "Bo", 3),
                entry("a", "Ari", 1),
                entry("d", "Dee", 0),
            ],
            3,
        );
        let order: Vec<_> = ranked.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(ranked[0].completion_count, 5);
    }

    #[tokio::test]
    async fn refresh_fills_both_scopes() {
        let store = Arc::new(FakeStore::default());
        store.set_global(&[("a", 2), ("b", 7)]);
        store.set_friends("me", &[("a", 2)]);
        let cache = cache(&store);

        assert_eq!(cache.refresh(Some("me")).await, RefreshOutcome::Fetched);

        let view = cache.view();
        assert_eq!(view.viewer_id.as_deref(), Some("me"));
        assert_eq!(ids(&view.global), vec!["b", "a"]);
        assert_eq!(ids(&view.friends), vec!["a"]);
        assert!(!view.global.loading && !view.friends.loading);
    }

    #[tokio::test]
    async fn concurrent_refreshes_issue_one_fetch_per_scope() {
        let store = Arc::new(FakeStore::default());
        let gate = store.hold();
        let cache = cache(&store);

        let (first, second) = tokio::join!(cache.refresh(Some("me")), async {
            let outcome = cache.refresh(Some("me")).await;
            gate.add_permits(2);
            outcome
        });

        assert_eq!(first, RefreshOutcome::Fetched);
        assert_eq!(second, RefreshOutcome::Coalesced);
        assert_eq!(store.count("global"), 1);
        assert_eq!(store.count("friends"), 1);

        assert_eq!(cache.refresh(Some("me")).await, RefreshOutcome::Fresh);
        assert_eq!(store.count("global"), 1);
    }

    #[tokio::test]
    async fn anonymous_viewer_skips_friends_scope() {
        let store = Arc::new(FakeStore::default());
        store.set_global(&[("a", 1)]);
        let cache = cache(&store);

        cache.refresh(None).await;

        assert_eq!(store.count("global:-"), 1);
        assert_eq!(store.count("friends"), 0);
        let view = cache.view();
        assert_eq!(ids(&view.global), vec!["a"]);
        assert!(view.friends.entries.is_empty());
    }

    #[tokio::test]
    async fn identity_switch_clears_before_fetch_resolves() {
        let store = Arc::new(FakeStore::default());
        store.set_global(&[("x", 4)]);
        store.set_friends("a", &[("fa", 3)]);
        store.set_friends("b", &[("fb", 1)]);
        let cache = cache(&store);
        cache.refresh(Some("a")).await;
        assert_eq!(ids(&cache.view().friends), vec!["fa"]);

        let gate = store.hold();
        let (outcome, during) = tokio::join!(cache.refresh(Some("b")), async {
            let during = cache.view();
            gate.add_permits(2);
            during
        });

        assert_eq!(outcome, RefreshOutcome::Fetched);
        assert_eq!(during.viewer_id.as_deref(), Some("b"));
        assert!(during.global.entries.is_empty());
        assert!(during.friends.entries.is_empty());
        assert!(during.global.loading && during.friends.loading);
        assert_eq!(ids(&cache.view().friends), vec!["fb"]);
    }

    #[tokio::test]
    async fn superseded_response_is_dropped() {
        let store = Arc::new(FakeStore::default());
        store.set_friends("a", &[("fa", 3)]);
        store.set_friends("b", &[("fb", 1)]);
        let gate = store.hold();
        let cache = cache(&store);

        let (a, b) = tokio::join!(cache.refresh(Some("a")), async {
            let b = cache.refresh(Some("b"));
            gate.add_permits(4);
            b.await
        });

        assert_eq!(a, RefreshOutcome::Superseded);
        assert_eq!(b, RefreshOutcome::Fetched);
        let view = cache.view();
        assert_eq!(view.viewer_id.as_deref(), Some("b"));
        assert_eq!(ids(&view.friends), vec!["fb"]);
        assert_eq!(cache.refresh(Some("b")).await, RefreshOutcome::Fresh);
    }

    #[tokio::test]
    async fn invalidate_refetches_both_scopes() {
        let store = Arc::new(FakeStore::default());
        store.set_global(&[("me", 1)]);
        let cache = cache(&store);
        cache.refresh(Some("me")).await;

        store.set_global(&[("me", 2)]);
        assert_eq!(cache.invalidate_all().await, Some(RefreshOutcome::Fetched));

        assert_eq!(store.count("global"), 2);
        assert_eq!(store.count("friends"), 2);
        assert_eq!(cache.view().global.entries[0].completion_count, 2);
    }

    #[tokio::test]
    async fn invalidate_before_any_refresh_is_noop() {
        let store = Arc::new(FakeStore::default());
        let cache = cache(&store);
        assert_eq!(cache.invalidate_all().await, None);
        assert_eq!(store.count(""), 0);
    }

    #[tokio::test]
    async fn invalidate_during_fetch_runs_one_more_fetch() {
        let store = Arc::new(FakeStore::default());
        store.set_global(&[("me", 1)]);
        let gate = store.hold();
        let cache = cache(&store);

        let (outcome, queued) = tokio::join!(cache.refresh(Some("me")), async {
            let queued = cache.invalidate_all().await;
            gate.add_permits(4);
            queued
        });

        assert_eq!(outcome, RefreshOutcome::Fetched);
        assert_eq!(queued, None);
        assert_eq!(store.count("global"), 2);
        assert_eq!(store.count("friends"), 2);
        assert_eq!(cache.refresh(Some("me")).await, RefreshOutcome::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_refresh_releases_the_cache() {
        let store = Arc::new(FakeStore::default());
        store.set_global(&[("a", 1)]);
        let gate = store.hold();
        let cache = cache(&store);

        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), cache.refresh(Some("me")))
                .await;
        assert!(timed_out.is_err());
        let view = cache.view();
        assert!(!view.global.loading && !view.friends.loading);

        gate.add_permits(2);
        assert_eq!(cache.refresh(Some("me")).await, RefreshOutcome::Fetched);
        assert_eq!(ids(&cache.view().global), vec!["a"]);
        assert_eq!(store.count("global"), 2);
    }

    #[tokio::test]
    async fn stale_signal_returns_before_the_refetch() {
        let store = Arc::new(FakeStore::default());
        store.set_global(&[("me", 1)]);
        let cache = Arc::new(cache(&store));
        cache.refresh(Some("me")).await;

        let gate = store.hold();
        store.set_global(&[("me", 2)]);
        cache.stale_signal().invalidate().await;
        assert_eq!(store.count("global"), 1);

        let mut rx = cache.subscribe();
        gate.add_permits(2);
        rx.wait_for(|v| v.global.entries.first().map(|e| e.completion_count) == Some(2))
            .await
            .unwrap();
        assert_eq!(store.count("global"), 2);
        assert_eq!(store.count("friends"), 2);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_entries() {
        let store = Arc::new(FakeStore::default());
        store.set_global(&[("a", 1)]);
        let cache = cache(&store);
        cache.refresh(Some("me")).await;

        store.fail.store(true, Ordering::SeqCst);
        cache.invalidate_all().await;

        let view = cache.view();
        assert_eq!(ids(&view.global), vec!["a"]);
        assert!(!view.global.loading);
        assert!(view.last_error.is_some());

        store.fail.store(false, Ordering::SeqCst);
        assert_eq!(cache.refresh(Some("me")).await, RefreshOutcome::Fetched);
        assert!(cache.view().last_error.is_none());
    }

    #[tokio::test]
    async fn new_week_refetches() {
        let store = Arc::new(FakeStore::default());
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 11, 23, 0, 0).unwrap());
        let cache = LeaderboardCache::new(store.clone(), Arc::new(clock.clone()), 50);

        cache.refresh(Some("me")).await;
        clock.advance_ms(30 * 60 * 1000);
        assert_eq!(cache.refresh(Some("me")).await, RefreshOutcome::Fresh);

        clock.advance_ms(60 * 60 * 1000);
        assert_eq!(cache.refresh(Some("me")).await, RefreshOutcome::Fetched);
        assert_eq!(store.count("global"), 2);
    }

    #[tokio::test]
    async fn follows_identity_changes() {
        let store = Arc::new(FakeStore::default());
        store.set_global(&[("x", 4)]);
        store.set_friends("a", &[("fa", 3)]);
        let cache = Arc::new(cache(&store));
        let identity = WatchIdentity::new(Some(Viewer {
            id: "a".to_string(),
            display_name: "A".to_string(),
            avatar_ref: None,
        }));
        let mut rx = cache.subscribe();
        let handle = Arc::clone(&cache).follow_identity(identity.subscribe());

        rx.wait_for(|v| v.viewer_id.as_deref() == Some("a") && !v.friends.entries.is_empty())
            .await
            .unwrap();

        identity.set_viewer(None);
        rx.wait_for(|v| v.viewer_id.is_none() && !v.global.entries.is_empty())
            .await
            .unwrap();
        assert!(cache.view().friends.entries.is_empty());
        assert_eq!(store.count("friends"), 1);

        handle.abort();
    }
}
