//! Collaborator contracts driven by the cycle controller.
//!
//! Rendering, sound, vibration and the screen wake lock live outside the
//! core. The controller calls them fire-and-forget: an `Err` is logged and
//! the cycle carries on.

mod recorder;

pub use recorder::EventRecorder;

use serde::{Deserialize, Serialize};

use crate::error::EffectError;
use crate::timer::{CycleStatus, LiquidColor, SessionKind};

/// Pattern played on every session end, in milliseconds (on, off, on, ...).
pub const DEFAULT_VIBRATION_PATTERN: [u32; 5] = [500, 200, 500, 200, 500];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    SessionStart,
    WorkEnd,
    ShortBreakEnd,
    LongBreakEnd,
}

impl Cue {
    /// Cue announcing the end of a session of `kind`.
    pub fn ending(kind: SessionKind) -> Self {
        match kind {
            SessionKind::Work => Cue::WorkEnd,
            SessionKind::ShortBreak => Cue::ShortBreakEnd,
            SessionKind::LongBreak => Cue::LongBreakEnd,
        }
    }
}

/// Receives progress for display. Implementations must not block.
pub trait RenderSink: Send {
    fn on_tick(&mut self, kind: SessionKind, fraction: f64, clock: &str);

    fn on_session_start(
        &mut self,
        kind: SessionKind,
        index: usize,
        total_sessions: usize,
        liquid: LiquidColor,
    );

    fn on_session_complete(&mut self, index: usize, kind: SessionKind);

    fn on_finished(&mut self, completed_work_units: u32, total_work_minutes: u64);

    /// Called on pause, resume and reset.
    fn on_status(&mut self, _status: CycleStatus) {}
}

pub trait AudioCue: Send {
    fn play_cue(&mut self, cue: Cue) -> Result<(), EffectError>;
}

pub trait Haptics: Send {
    /// No-op when the device cannot vibrate.
    fn vibrate(&mut self, pattern_ms: &[u32]) -> Result<(), EffectError>;
}

/// Opaque token for a held wake lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WakeLockHandle(pub u64);

pub trait WakeLock: Send {
    fn acquire(&mut self) -> Result<WakeLockHandle, EffectError>;

    fn release(&mut self, handle: WakeLockHandle) -> Result<(), EffectError>;
}

/// Does nothing. Used when a collaborator is absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct Noop;

impl RenderSink for Noop {
    fn on_tick(&mut self, _kind: SessionKind, _fraction: f64, _clock: &str) {}

    fn on_session_start(
        &mut self,
        _kind: SessionKind,
        _index: usize,
        _total_sessions: usize,
        _liquid: LiquidColor,
    ) {
    }

    fn on_session_complete(&mut self, _index: usize, _kind: SessionKind) {}

    fn on_finished(&mut self, _completed_work_units: u32, _total_work_minutes: u64) {}
}

impl AudioCue for Noop {
    fn play_cue(&mut self, _cue: Cue) -> Result<(), EffectError> {
        Ok(())
    }
}

impl Haptics for Noop {
    fn vibrate(&mut self, _pattern_ms: &[u32]) -> Result<(), EffectError> {
        Ok(())
    }
}

impl WakeLock for Noop {
    fn acquire(&mut self) -> Result<WakeLockHandle, EffectError> {
        Err(EffectError::Unsupported("wake lock"))
    }

    fn release(&mut self, _handle: WakeLockHandle) -> Result<(), EffectError> {
        Ok(())
    }
}

/// The full set of collaborators handed to a controller.
pub struct Effects {
    pub render: Box<dyn RenderSink>,
    pub audio: Box<dyn AudioCue>,
    pub haptics: Box<dyn Haptics>,
    pub wake_lock: Box<dyn WakeLock>,
}

impl Effects {
    pub fn silent() -> Self {
        Self {
            render: Box::new(Noop),
            audio: Box::new(Noop),
            haptics: Box::new(Noop),
            wake_lock: Box::new(Noop),
        }
    }

    /// Route every collaborator into one recorder.
    pub fn recorded(recorder: &EventRecorder) -> Self {
        Self {
            render: Box::new(recorder.clone()),
            audio: Box::new(recorder.clone()),
            haptics: Box::new(recorder.clone()),
            wake_lock: Box::new(recorder.clone()),
        }
    }
}

impl std::fmt::Debug for Effects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effects").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ending_cue_follows_kind() {
        assert_eq!(Cue::ending(SessionKind::Work), Cue::WorkEnd);
        assert_eq!(Cue::ending(SessionKind::ShortBreak), Cue::ShortBreakEnd);
        assert_eq!(Cue::ending(SessionKind::LongBreak), Cue::LongBreakEnd);
    }

    #[test]
    fn noop_wake_lock_is_unsupported() {
        let mut lock = Noop;
        assert_eq!(
            lock.acquire(),
            Err(EffectError::Unsupported("wake lock"))
        );
    }
}
