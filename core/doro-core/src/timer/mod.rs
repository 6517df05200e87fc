//! Focus timer: durable record, reconciliation and the session lifecycle.
//!
//! # Architecture
//!
//! ```text
//! user action ─▶ SessionController ─▶ TimerStore (timerState) ◀─ other tabs
//!                      │    ▲                    │
//!                      │    └──── resolve() ◀────┘   (mount / visible)
//!                      ▼
//!                SessionView (watch) ─▶ UI, navigation guard
//! ```
//!
//! # Module Structure
//!
//! - [`types`]: the persisted record and lifecycle phases
//! - [`store`]: file-backed and in-memory record storage
//! - [`resolver`]: pure record + instant → phase derivation
//! - [`controller`]: transitions, ticking and publish

mod controller;
mod resolver;
mod store;
mod types;

pub use controller::{SessionController, SessionView};
pub use resolver::{resolve, Resolution};
pub use store::{FileTimerStore, MemoryTimerStore, TimerStore};
pub use types::{Countdown, SessionPhase, TimerState};
