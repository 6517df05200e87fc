//! The durable timer record and the lifecycle phases derived from it.
//!
//! On-disk format (key `timerState`):
//!
//! ```json
//! {
//!   "endTime": 1767603600000,
//!   "isPaused": false,
//!   "originalDuration": 1500000,
//!   "launchAt": "2026-01-05T09:00:00Z",
//!   "task": "Write report"
//! }
//! ```
//!
//! A paused record carries `pausedTimeLeft` instead of `endTime`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Running,
    Paused,
    Completed,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Running => "running",
            SessionPhase::Paused => "paused",
            SessionPhase::Completed => "completed",
        }
    }

    /// Whether navigation away should be guarded.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, SessionPhase::Running | SessionPhase::Paused)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Largest instant (9999-12-31T23:59:59.999Z) or span a record may carry.
/// Anything outside `0..=MAX_RECORD_MS` reads as corrupt.
pub(crate) const MAX_RECORD_MS: i64 = 253_402_300_799_999;

fn in_range(ms: i64) -> bool {
    (0..=MAX_RECORD_MS).contains(&ms)
}

/// Which half of the record is authoritative, selected by `isPaused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Running { end_time_ms: i64 },
    Paused { time_left_ms: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_time_left: Option<i64>,
    pub is_paused: bool,
    pub original_duration: i64,
    pub launch_at: DateTime<Utc>,
    pub task: String,
}

impl TimerState {
    /// A fresh running record launched at `now`. `None` when the end time
    /// would fall outside the representable range.
    pub fn launch(task: impl Into<String>, duration_ms: i64, now: DateTime<Utc>) -> Option<Self> {
        let end_time = now
            .timestamp_millis()
            .checked_add(duration_ms)
            .filter(|end| in_range(*end) && in_range(duration_ms))?;
        Some(TimerState {
            end_time: Some(end_time),
            paused_time_left: None,
            is_paused: false,
            original_duration: duration_ms,
            launch_at: now,
            task: task.into(),
        })
    }

    /// Returns `None` when the discriminant disagrees with the payload.
    pub fn countdown(&self) -> Option<Countdown> {
        if !in_range(self.original_duration) {
            return None;
        }
        match (self.is_paused, self.end_time, self.paused_time_left) {
            (true, _, Some(left)) if in_range(left) => Some(Countdown::Paused { time_left_ms: left }),
            (false, Some(end), _) if in_range(end) => Some(Countdown::Running { end_time_ms: end }),
            _ => None,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.countdown().is_some()
    }

    /// Same session, frozen with `time_left_ms` remaining.
    pub fn paused_with(&self, time_left_ms: i64) -> Self {
        TimerState {
            end_time: None,
            paused_time_left: Some(time_left_ms.max(0)),
            is_paused: true,
            ..self.clone()
        }
    }

    /// Same session, running until `end_time_ms`.
    pub fn running_until(&self, end_time_ms: i64) -> Self {
        TimerState {
            end_time: Some(end_time_ms),
            paused_time_left: None,
            is_paused: false,
            ..self.clone()
        }
    }

    pub fn with_task(&self, task: impl Into<String>) -> Self {
        TimerState {
            task: task.into(),
            ..self.clone()
        }
    }
}
