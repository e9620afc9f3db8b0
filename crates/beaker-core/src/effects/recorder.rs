use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::{AudioCue, Cue, Haptics, RenderSink, WakeLock, WakeLockHandle};
use crate::error::EffectError;
use crate::events::Event;
use crate::timer::{CycleStatus, LiquidColor, SessionKind};

#[derive(Debug, Default)]
struct RecorderInner {
    events: Vec<Event>,
    next_handle: u64,
    held: Option<WakeLockHandle>,
    deny_wake_lock: bool,
    mute_audio: bool,
}

/// Collaborator that turns every call into an [`Event`].
///
/// Clones share the same log, so one clone can be handed to the controller
/// while another is kept for reading.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    inner: Arc<Mutex<RecorderInner>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `acquire` fail, like a browser without wake-lock support.
    pub fn deny_wake_lock(&self, deny: bool) {
        self.lock().deny_wake_lock = deny;
    }

    /// Make every `play_cue` fail.
    pub fn mute_audio(&self, mute: bool) {
        self.lock().mute_audio = mute;
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut self.lock().events)
    }

    pub fn count(&self, tag: &str) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|e| e.kind_tag() == tag)
            .count()
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::CuePlayed { cue, .. } => Some(*cue),
                _ => None,
            })
            .collect()
    }

    pub fn holds_wake_lock(&self) -> bool {
        self.lock().held.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, RecorderInner> {
        // A panic while holding the lock only poisons test bookkeeping.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, event: Event) {
        self.lock().events.push(event);
    }
}

impl RenderSink for EventRecorder {
    fn on_tick(&mut self, kind: SessionKind, fraction: f64, clock: &str) {
        self.push(Event::Tick {
            kind,
            fraction,
            clock: clock.to_string(),
            at: Utc::now(),
        });
    }

    fn on_session_start(
        &mut self,
        kind: SessionKind,
        index: usize,
        total_sessions: usize,
        liquid: LiquidColor,
    ) {
        self.push(Event::SessionStarted {
            index,
            total_sessions,
            kind,
            liquid_hue: liquid.hue(),
            at: Utc::now(),
        });
    }

    fn on_session_complete(&mut self, index: usize, kind: SessionKind) {
        self.push(Event::SessionCompleted {
            index,
            kind,
            at: Utc::now(),
        });
    }

    fn on_finished(&mut self, completed_work_units: u32, total_work_minutes: u64) {
        self.push(Event::CycleFinished {
            completed_work_units,
            total_work_minutes,
            at: Utc::now(),
        });
    }

    fn on_status(&mut self, status: CycleStatus) {
        self.push(Event::StatusChanged {
            status,
            at: Utc::now(),
        });
    }
}

impl AudioCue for EventRecorder {
    fn play_cue(&mut self, cue: Cue) -> Result<(), EffectError> {
        let mut inner = self.lock();
        if inner.mute_audio {
            return Err(EffectError::Failed {
                effect: "audio",
                message: "output device unavailable".into(),
            });
        }
        inner.events.push(Event::CuePlayed {
            cue,
            at: Utc::now(),
        });
        Ok(())
    }
}

impl Haptics for EventRecorder {
    fn vibrate(&mut self, pattern_ms: &[u32]) -> Result<(), EffectError> {
        self.push(Event::Vibrated {
            pattern_ms: pattern_ms.to_vec(),
            at: Utc::now(),
        });
        Ok(())
    }
}

impl WakeLock for EventRecorder {
    fn acquire(&mut self) -> Result<WakeLockHandle, EffectError> {
        let mut inner = self.lock();
        if inner.deny_wake_lock {
            return Err(EffectError::Unsupported("wake lock"));
        }
        inner.next_handle += 1;
        let handle = WakeLockHandle(inner.next_handle);
        inner.held = Some(handle);
        inner.events.push(Event::WakeLockAcquired { at: Utc::now() });
        Ok(handle)
    }

    fn release(&mut self, handle: WakeLockHandle) -> Result<(), EffectError> {
        let mut inner = self.lock();
        if inner.held != Some(handle) {
            return Err(EffectError::Failed {
                effect: "wake lock",
                message: format!("handle {} is not held", handle.0),
            });
        }
        inner.held = None;
        inner.events.push(Event::WakeLockReleased { at: Utc::now() });
        Ok(())
    }
}
