//! Session lifecycle controller.
//!
//! ```text
//! idle ──start──▶ running ◀──resume── paused
//!                   │  └────pause──────▶ │
//!                   │ tick (≤0)          │
//!                   ▼                    │
//!               completed ──publish──▶ idle
//!  running | paused | completed ──cancel──▶ idle
//! ```
//!
//! The durable [`TimerState`] is written on every transition and re-read before
//! every overwrite; in-memory fields only cache what was last read, for display.
//! Each state change is broadcast as a [`SessionView`] on a watch channel so the
//! UI never reaches into the controller.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use doro_protocol::{ErrorInfo, PublishSessionRequest};
use tokio::sync::watch;
use ulid::Ulid;

use crate::chime::{play_best_effort, Chime, ChimeCue, SilentChime};
use crate::clock::Clock;
use crate::collab::SessionPersistence;
use crate::error::{DoroError, Result};
use crate::leaderboard::LeaderboardInvalidator;

use super::resolver::resolve;
use super::store::TimerStore;
use super::types::{Countdown, SessionPhase, TimerState, MAX_RECORD_MS};

/// Everything a surface needs to render the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub task: Option<String>,
    pub launch_at: Option<DateTime<Utc>>,
    pub original_duration_ms: Option<i64>,
    pub remaining_ms: i64,
    /// Consumed by navigation guards outside the core.
    pub in_progress: bool,
    pub publishing: bool,
    pub last_error: Option<String>,
}

impl SessionView {
    fn idle() -> Self {
        SessionView {
            phase: SessionPhase::Idle,
            task: None,
            launch_at: None,
            original_duration_ms: None,
            remaining_ms: 0,
            in_progress: false,
            publishing: false,
            last_error: None,
        }
    }
}

pub struct SessionController {
    instance: Ulid,
    store: Arc<dyn TimerStore>,
    clock: Arc<dyn Clock>,
    persistence: Arc<dyn SessionPersistence>,
    invalidator: Option<Arc<dyn LeaderboardInvalidator>>,
    chime: Arc<dyn Chime>,
    chime_enabled: bool,

    phase: SessionPhase,
    record: Option<TimerState>,
    remaining_ms: i64,
    publishing: bool,
    last_error: Option<String>,
    updates: watch::Sender<SessionView>,
}

impl SessionController {
    /// Creates an unmounted controller in `idle`. Call [`mount`](Self::mount)
    /// to adopt whatever session durable storage already holds.
    pub fn new(
        store: Arc<dyn TimerStore>,
        clock: Arc<dyn Clock>,
        persistence: Arc<dyn SessionPersistence>,
    ) -> Self {
        let (updates, _rx) = watch::channel(SessionView::idle());
        Self {
            instance: Ulid::new(),
            store,
            clock,
            persistence,
            invalidator: None,
            chime: Arc::new(SilentChime),
            chime_enabled: true,
            phase: SessionPhase::Idle,
            record: None,
            remaining_ms: 0,
            publishing: false,
            last_error: None,
            updates,
        }
    }

    pub fn with_chime(mut self, chime: Arc<dyn Chime>, enabled: bool) -> Self {
        self.chime = chime;
        self.chime_enabled = enabled;
        self
    }

    /// Signalled after every successful publish.
    pub fn with_invalidator(mut self, invalidator: Arc<dyn LeaderboardInvalidator>) -> Self {
        self.invalidator = Some(invalidator);
        self
    }

    pub fn instance_id(&self) -> Ulid {
        self.instance
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.updates.subscribe()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            task: self.record.as_ref().map(|r| r.task.clone()),
            launch_at: self.record.as_ref().map(|r| r.launch_at),
            original_duration_ms: self.record.as_ref().map(|r| r.original_duration),
            remaining_ms: self.remaining_ms,
            in_progress: self.phase.is_in_progress(),
            publishing: self.publishing,
            last_error: self.last_error.clone(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reconciliation
    // ─────────────────────────────────────────────────────────────────────────

    pub fn mount(&mut self) -> SessionView {
        self.reconcile()
    }

    /// Hidden tabs keep their stale counters; becoming visible re-reads storage.
    pub fn on_visibility_change(&mut self, visible: bool) -> SessionView {
        if visible {
            self.reconcile()
        } else {
            self.view()
        }
    }

    /// Recomputes live state from durable storage. Idempotent for a fixed instant.
    pub fn reconcile(&mut self) -> SessionView {
        let record = self.store.load();
        let resolution = resolve(record.as_ref(), self.clock.now_ms());
        let previous = self.phase;

        self.record = record;
        self.remaining_ms = resolution.remaining_ms;

        match resolution.phase {
            SessionPhase::Completed if previous != SessionPhase::Completed => {
                // Only a tab that watched the countdown announces it.
                self.complete(previous == SessionPhase::Running);
            }
            SessionPhase::Idle => {
                self.phase = SessionPhase::Idle;
                self.last_error = None;
            }
            phase => self.phase = phase,
        }

        if previous != self.phase {
            tracing::debug!(
                instance = %self.instance,
                from = %previous,
                to = %self.phase,
                "Reconciled session from storage"
            );
        }
        self.broadcast()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn start(&mut self, task: impl Into<String>, duration_ms: i64) -> Result<SessionView> {
        self.require(&[SessionPhase::Idle], "start")?;
        if duration_ms <= 0 {
            return Err(DoroError::InvalidPayload(ErrorInfo::new(
                "invalid_duration",
                "duration must be positive",
            )));
        }

        let record = TimerState::launch(task, duration_ms, self.clock.now())
            .ok_or_else(out_of_range)?;
        self.store.save(&record)?;
        tracing::info!(
            instance = %self.instance,
            task = %record.task,
            duration_ms,
            "Session started"
        );

        self.remaining_ms = duration_ms;
        self.record = Some(record);
        self.phase = SessionPhase::Running;
        self.last_error = None;
        self.chime(ChimeCue::Start);
        Ok(self.broadcast())
    }

    pub fn pause(&mut self) -> Result<SessionView> {
        self.require(&[SessionPhase::Running], "pause")?;
        let record = self.fresh_record()?;
        let now = self.clock.now_ms();

        let end_time_ms = match record.countdown() {
            Some(Countdown::Running { end_time_ms }) => end_time_ms,
            _ => return Err(self.diverged("pause")),
        };
        if end_time_ms <= now {
            self.reconcile();
            return Err(self.invalid("pause"));
        }

        // Everything but the countdown comes from the record just read, so the
        // original duration survives any number of pause/resume cycles.
        let paused = record.paused_with(end_time_ms - now);
        self.store.save(&paused)?;
        tracing::info!(
            instance = %self.instance,
            time_left_ms = end_time_ms - now,
            "Session paused"
        );

        self.remaining_ms = end_time_ms - now;
        self.record = Some(paused);
        self.phase = SessionPhase::Paused;
        Ok(self.broadcast())
    }

    pub fn resume(&mut self) -> Result<SessionView> {
        self.require(&[SessionPhase::Paused], "resume")?;
        let record = self.fresh_record()?;
        let now = self.clock.now_ms();

        let time_left_ms = match record.countdown() {
            Some(Countdown::Paused { time_left_ms }) => time_left_ms,
            _ => return Err(self.diverged("resume")),
        };

        let end_time_ms = now
            .checked_add(time_left_ms)
            .filter(|end| *end <= MAX_RECORD_MS)
            .ok_or_else(out_of_range)?;

        let running = record.running_until(end_time_ms);
        self.store.save(&running)?;
        tracing::info!(
            instance = %self.instance,
            end_time_ms,
            "Session resumed"
        );

        self.remaining_ms = time_left_ms;
        self.record = Some(running);
        self.phase = SessionPhase::Running;
        Ok(self.broadcast())
    }

    /// Display update. Fires completion when a running countdown reaches zero.
    pub fn tick(&mut self) -> SessionView {
        if self.phase != SessionPhase::Running {
            return self.view();
        }
        let end_time_ms = match self.record.as_ref().and_then(TimerState::countdown) {
            Some(Countdown::Running { end_time_ms }) => end_time_ms,
            _ => return self.reconcile(),
        };

        self.remaining_ms = end_time_ms - self.clock.now_ms();
        if self.remaining_ms <= 0 {
            self.complete(true);
        }
        self.broadcast()
    }

    /// Ticks every `period` until the session leaves `running`.
    pub async fn drive(&mut self, period: Duration) -> SessionView {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        while self.phase == SessionPhase::Running {
            interval.tick().await;
            self.tick();
        }
        self.view()
    }

    /// Edits the label of the current session; other fields are preserved.
    pub fn set_task(&mut self, task: impl Into<String>) -> Result<SessionView> {
        self.require(
            &[
                SessionPhase::Running,
                SessionPhase::Paused,
                SessionPhase::Completed,
            ],
            "edit task",
        )?;
        let record = self.fresh_record()?.with_task(task);
        self.store.save(&record)?;
        self.record = Some(record);
        Ok(self.broadcast())
    }

    /// Abandons the session. No server interaction.
    pub fn cancel(&mut self) -> Result<SessionView> {
        if self.phase == SessionPhase::Idle {
            return Err(self.invalid("cancel"));
        }
        self.store.clear()?;
        tracing::info!(instance = %self.instance, from = %self.phase, "Session discarded");

        self.reset_to_idle();
        Ok(self.broadcast())
    }

    /// Publishes the completed session. On failure the session stays `completed`
    /// with its record intact; retry by calling `publish` again.
    pub async fn publish(
        &mut self,
        notes: Option<String>,
        image_ref: Option<String>,
    ) -> Result<SessionView> {
        self.require(&[SessionPhase::Completed], "publish")?;
        let record = self.fresh_record()?;

        let request = PublishSessionRequest {
            task: record.task.clone(),
            notes: notes.filter(|n| !n.trim().is_empty()),
            launch_at: record
                .launch_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            completed: true,
            image_ref,
        };
        if let Err(info) = request.validate() {
            self.last_error = Some(info.message.clone());
            self.broadcast();
            return Err(DoroError::InvalidPayload(info));
        }

        self.publishing = true;
        self.last_error = None;
        self.broadcast();

        let outcome = self.persistence.publish_session(&request).await;
        self.publishing = false;

        if let Err(err) = outcome {
            tracing::warn!(instance = %self.instance, error = %err, "Publish failed; session kept");
            self.last_error = Some(err.to_string());
            self.broadcast();
            return Err(DoroError::service("publish session", err));
        }

        tracing::info!(instance = %self.instance, task = %request.task, "Session published");
        if let Err(err) = self.store.clear() {
            // Already published; a leftover record would only resurface as completed.
            tracing::error!(instance = %self.instance, error = %err, "Failed to clear published timer record");
        }
        if let Some(invalidator) = &self.invalidator {
            invalidator.invalidate().await;
        }

        self.reset_to_idle();
        Ok(self.broadcast())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn complete(&mut self, announce: bool) {
        self.phase = SessionPhase::Completed;
        self.remaining_ms = 0;
        tracing::info!(instance = %self.instance, "Session completed");
        if announce {
            self.chime(ChimeCue::Complete);
        }
    }

    fn reset_to_idle(&mut self) {
        self.phase = SessionPhase::Idle;
        self.record = None;
        self.remaining_ms = 0;
        self.publishing = false;
        self.last_error = None;
    }

    /// Re-reads the durable record before an overwrite. A missing record means
    /// another tab ended the session; adopt that and report it.
    fn fresh_record(&mut self) -> Result<TimerState> {
        match self.store.load() {
            Some(record) => Ok(record),
            None => {
                tracing::warn!(instance = %self.instance, "Timer record vanished; reconciling");
                self.reconcile();
                Err(DoroError::SessionMissing)
            }
        }
    }

    /// Storage moved on under this tab (last write wins): adopt it, then refuse.
    fn diverged(&mut self, action: &'static str) -> DoroError {
        tracing::debug!(instance = %self.instance, action, "Stored session diverged; reconciling");
        self.reconcile();
        self.invalid(action)
    }

    fn require(&self, allowed: &[SessionPhase], action: &'static str) -> Result<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> DoroError {
        DoroError::InvalidTransition {
            action,
            phase: self.phase,
        }
    }

    fn chime(&self, cue: ChimeCue) {
        if self.chime_enabled {
            play_best_effort(self.chime.as_ref(), cue);
        }
    }

    fn broadcast(&self) -> SessionView {
        let view = self.view();
        self.updates.send_replace(view.clone());
        view
    }
}

fn out_of_range() -> DoroError {
    DoroError::InvalidPayload(ErrorInfo::new(
        "invalid_duration",
        "end time out of range",
    ))
}
