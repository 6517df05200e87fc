//! DoroEngine - the entry point hosts embed.
//!
//! The engine owns configuration, storage paths, the collaborator handles and
//! the one [`LeaderboardCache`] every surface shares. It hands out the
//! per-surface state machines already wired together:
//! - session controllers persist to `<root>/timerState.json` and invalidate the
//!   shared leaderboard cache after each publish
//! - follow controls, follow lists and request monitors act as the current viewer
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use doro_core::{Collaborators, DoroEngine};
//!
//! let engine = DoroEngine::new(collaborators);
//! let mut session = engine.mount_session();
//! session.start("Write report", engine.config().default_duration_ms)?;
//! ```

use std::sync::Arc;

use doro_protocol::Viewer;
use tokio::task::JoinHandle;

use crate::chime::{Chime, SilentChime};
use crate::clock::{Clock, SystemClock};
use crate::collab::{IdentityProvider, SessionPersistence};
use crate::config::{load_config_with_storage, save_config_with_storage, DoroConfig};
use crate::error::Result;
use crate::leaderboard::{LeaderboardCache, LeaderboardStore, RefreshOutcome};
use crate::social::{
    FollowControl, FollowList, IncomingRequests, ListKind, ListedUser, PendingRequestMonitor,
    RefreshSignal, SocialGraph,
};
use crate::storage::StorageConfig;
use crate::timer::{FileTimerStore, SessionController, TimerStore};

/// Remote services the core talks to. Transports live in the host.
#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityProvider>,
    pub graph: Arc<dyn SocialGraph>,
    pub leaderboard: Arc<dyn LeaderboardStore>,
    pub persistence: Arc<dyn SessionPersistence>,
}

pub struct DoroEngine {
    storage: StorageConfig,
    config: DoroConfig,
    collab: Collaborators,
    clock: Arc<dyn Clock>,
    chime: Arc<dyn Chime>,
    timer_store: Arc<dyn TimerStore>,
    leaderboard: Arc<LeaderboardCache>,
}

impl DoroEngine {
    /// Engine over `~/.doro`.
    pub fn new(collab: Collaborators) -> Self {
        Self::with_storage(StorageConfig::default(), collab)
    }

    /// Used for testing with temp directories or custom storage locations.
    pub fn with_storage(storage: StorageConfig, collab: Collaborators) -> Self {
        let config = load_config_with_storage(&storage);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let timer_store: Arc<dyn TimerStore> = Arc::new(FileTimerStore::with_storage(&storage));
        let leaderboard = Arc::new(LeaderboardCache::new(
            Arc::clone(&collab.leaderboard),
            Arc::clone(&clock),
            config.leaderboard_limit,
        ));
        tracing::debug!(root = %storage.root().display(), "Engine initialized");
        Self {
            storage,
            config,
            collab,
            clock,
            chime: Arc::new(SilentChime),
            timer_store,
            leaderboard,
        }
    }

    /// Replaces the clock. The leaderboard cache is rebuilt so week
    /// boundaries follow the same clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.leaderboard = Arc::new(LeaderboardCache::new(
            Arc::clone(&self.collab.leaderboard),
            Arc::clone(&clock),
            self.config.leaderboard_limit,
        ));
        self.clock = clock;
        self
    }

    pub fn with_chime(mut self, chime: Arc<dyn Chime>) -> Self {
        self.chime = chime;
        self
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn config(&self) -> &DoroConfig {
        &self.config
    }

    /// Persists `config` and applies it to controllers created from now on.
    pub fn save_config(&mut self, config: DoroConfig) -> Result<()> {
        save_config_with_storage(&self.storage, &config)?;
        self.config = config;
        Ok(())
    }

    pub fn viewer(&self) -> Option<Viewer> {
        self.collab.identity.current_viewer()
    }

    fn viewer_id(&self) -> Option<String> {
        self.viewer().map(|viewer| viewer.id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sessions
    // ─────────────────────────────────────────────────────────────────────────

    /// A fresh, unmounted controller over the shared timer record.
    pub fn session_controller(&self) -> SessionController {
        SessionController::new(
            Arc::clone(&self.timer_store),
            Arc::clone(&self.clock),
            Arc::clone(&self.collab.persistence),
        )
        .with_chime(Arc::clone(&self.chime), self.config.chime_enabled)
        .with_invalidator(LeaderboardCache::stale_signal(&self.leaderboard))
    }

    /// A controller that has already adopted whatever session storage holds.
    pub fn mount_session(&self) -> SessionController {
        let mut controller = self.session_controller();
        controller.mount();
        controller
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Social
    // ─────────────────────────────────────────────────────────────────────────

    pub fn follow_control(&self, target: &str, known_following: bool) -> FollowControl {
        FollowControl::new(
            Arc::clone(&self.collab.graph),
            self.viewer_id().as_deref(),
            target,
            known_following,
        )
    }

    /// `None` for the anonymous viewer.
    pub fn follow_list(&self, kind: ListKind, rows: Vec<ListedUser>) -> Option<FollowList> {
        let viewer = self.viewer_id()?;
        Some(FollowList::new(
            Arc::clone(&self.collab.graph),
            &viewer,
            kind,
            rows,
        ))
    }

    /// Badge monitor polling at the configured interval. Call
    /// [`PendingRequestMonitor::spawn`] to start it.
    pub fn pending_requests(&self) -> Option<Arc<PendingRequestMonitor>> {
        let viewer = self.viewer_id()?;
        Some(Arc::new(PendingRequestMonitor::new(
            Arc::clone(&self.collab.graph),
            &viewer,
            self.config.pending_request_poll_interval(),
        )))
    }

    /// Inbox whose approve/reject actions fire `signal`.
    pub fn incoming_requests(&self, signal: RefreshSignal) -> Option<IncomingRequests> {
        let viewer = self.viewer_id()?;
        Some(IncomingRequests::new(
            Arc::clone(&self.collab.graph),
            &viewer,
            signal,
        ))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Leaderboards
    // ─────────────────────────────────────────────────────────────────────────

    pub fn leaderboard(&self) -> Arc<LeaderboardCache> {
        Arc::clone(&self.leaderboard)
    }

    pub async fn refresh_leaderboards(&self) -> RefreshOutcome {
        self.leaderboard.refresh(self.viewer_id().as_deref()).await
    }

    /// Keeps the shared cache on the current identity until aborted.
    pub fn follow_identity(&self) -> JoinHandle<()> {
        Arc::clone(&self.leaderboard).follow_identity(self.collab.identity.subscribe())
    }
}
