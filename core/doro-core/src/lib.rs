//! # doro-core
//!
//! Client-resident state for doro, the social focus timer: the durable session
//! timer and its lifecycle, the per-row follow/block state machine, and the
//! two-scope weekly leaderboard cache.
//!
//! ## Design Principles
//!
//! - **Durable storage is the source of truth**: the timer record is re-read
//!   before every overwrite and on every mount or return to visibility, so
//!   several tabs over one record converge.
//! - **Server-confirmed social state**: follow state only moves on an
//!   authoritative read or a confirmed mutation.
//! - **Graceful degradation**: corrupt records read as absent, failed fetches
//!   keep the last good data on screen.
//! - **Explicit update channels**: every state machine publishes snapshots on a
//!   `tokio::sync::watch` channel.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use doro_core::{Collaborators, DoroEngine};
//!
//! doro_core::logging::init();
//! let engine = DoroEngine::new(collaborators);
//! let mut session = engine.mount_session();
//! session.start("Write report", engine.config().default_duration_ms)?;
//! ```

pub mod chime;
pub mod clock;
pub mod collab;
pub mod config;
pub mod engine;
pub mod error;
pub mod leaderboard;
pub mod logging;
pub mod social;
pub mod storage;
pub mod timer;

pub use chime::{Chime, ChimeCue, SilentChime};
pub use clock::{Clock, ManualClock, SystemClock};
pub use collab::{IdentityProvider, SessionPersistence, WatchIdentity};
pub use config::{load_config_with_storage, save_config_with_storage, DoroConfig};
pub use engine::{Collaborators, DoroEngine};
pub use error::{DoroError, Result, ServiceError, ServiceResult};
pub use leaderboard::{
    LeaderboardCache, LeaderboardInvalidator, LeaderboardStore, LeaderboardView, RefreshOutcome,
};
pub use social::{
    FollowControl, FollowList, FollowState, IncomingRequests, PendingRequestMonitor,
    RefreshSignal, SocialGraph, ToggleOutcome,
};
pub use storage::StorageConfig;
pub use timer::{SessionController, SessionPhase, SessionView, TimerState};
