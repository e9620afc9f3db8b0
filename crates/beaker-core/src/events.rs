use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::effects::Cue;
use crate::timer::{CycleStatus, SessionKind};

/// Every observable side effect of the cycle controller, as data.
/// The CLI prints these as JSON lines; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        index: usize,
        total_sessions: usize,
        kind: SessionKind,
        liquid_hue: u16,
        at: DateTime<Utc>,
    },
    Tick {
        kind: SessionKind,
        fraction: f64,
        clock: String,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        index: usize,
        kind: SessionKind,
        at: DateTime<Utc>,
    },
    CycleFinished {
        completed_work_units: u32,
        total_work_minutes: u64,
        at: DateTime<Utc>,
    },
    StatusChanged {
        status: CycleStatus,
        at: DateTime<Utc>,
    },
    CuePlayed {
        cue: Cue,
        at: DateTime<Utc>,
    },
    Vibrated {
        pattern_ms: Vec<u32>,
        at: DateTime<Utc>,
    },
    WakeLockAcquired {
        at: DateTime<Utc>,
    },
    WakeLockReleased {
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Snake-case tag, matching the serialized `type` field.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            Event::SessionStarted { .. } => "session_started",
            Event::Tick { .. } => "tick",
            Event::SessionCompleted { .. } => "session_completed",
            Event::CycleFinished { .. } => "cycle_finished",
            Event::StatusChanged { .. } => "status_changed",
            Event::CuePlayed { .. } => "cue_played",
            Event::Vibrated { .. } => "vibrated",
            Event::WakeLockAcquired { .. } => "wake_lock_acquired",
            Event::WakeLockReleased { .. } => "wake_lock_released",
        }
    }
}
