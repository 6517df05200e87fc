//! Derives live lifecycle state from the durable record.
//!
//! Wall-clock time may have advanced arbitrarily while a tab was hidden or closed,
//! so the phase is always recomputed from `TimerState` plus `now`, never carried
//! over from in-memory counters.
//!
//! ```text
//! no record                         → idle
//! isPaused=true                     → paused    (remaining = pausedTimeLeft)
//! isPaused=false, endTime >  now    → running   (remaining = endTime - now)
//! isPaused=false, endTime <= now    → completed (expired while unattended)
//! ```

use super::types::{Countdown, SessionPhase, TimerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub phase: SessionPhase,
    pub remaining_ms: i64,
}

impl Resolution {
    const IDLE: Resolution = Resolution {
        phase: SessionPhase::Idle,
        remaining_ms: 0,
    };
}

/// Pure: the same record and instant always resolve identically.
pub fn resolve(record: Option<&TimerState>, now_ms: i64) -> Resolution {
    let Some(countdown) = record.and_then(TimerState::countdown) else {
        return Resolution::IDLE;
    };

    match countdown {
        Countdown::Paused { time_left_ms } => Resolution {
            phase: SessionPhase::Paused,
            remaining_ms: time_left_ms,
        },
        Countdown::Running { end_time_ms } if end_time_ms > now_ms => Resolution {
            phase: SessionPhase::Running,
            remaining_ms: end_time_ms - now_ms,
        },
        Countdown::Running { .. } => Resolution {
            phase: SessionPhase::Completed,
            remaining_ms: 0,
        },
    }
}
