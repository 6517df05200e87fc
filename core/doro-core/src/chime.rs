//! Audible cues on session start and completion. Playback is best-effort.

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChimeCue {
    Start,
    Complete,
}

impl ChimeCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChimeCue::Start => "start",
            ChimeCue::Complete => "complete",
        }
    }
}

pub trait Chime: Send + Sync {
    fn play(&self, cue: ChimeCue) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentChime;

impl Chime for SilentChime {
    fn play(&self, _cue: ChimeCue) -> Result<()> {
        Ok(())
    }
}

/// Plays `cue`, logging and discarding any failure.
pub(crate) fn play_best_effort(chime: &dyn Chime, cue: ChimeCue) {
    if let Err(err) = chime.play(cue) {
        tracing::warn!(cue = cue.as_str(), error = %err, "Chime playback failed; continuing");
    }
}
