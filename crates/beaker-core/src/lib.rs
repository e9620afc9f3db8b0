//! # Beaker Core Library
//!
//! Session planning and the session-cycle state machine behind the Beaker
//! work/break timer. Rendering, sound, vibration and wake locks are reached
//! through the traits in [`effects`]; the core never touches presentation.
//!
//! ## Architecture
//!
//! - **Plan**: [`generate`] turns a [`Configuration`] into a [`SessionPlan`]
//! - **Cycle**: [`SessionCycleController`] walks a plan one tick at a time
//! - **Driver**: [`TickDriver`] is a tokio countdown source for the controller
//! - **Storage**: TOML [`Settings`] with range validation

pub mod effects;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use effects::{AudioCue, Cue, Effects, EventRecorder, Haptics, RenderSink, WakeLock, WakeLockHandle};
pub use error::{ConfigError, CoreError, CycleError, EffectError, PlanError};
pub use events::Event;
pub use storage::{RangePolicy, Settings};
pub use timer::{
    generate, Configuration, ControlCommand, CycleOptions, CycleSnapshot, CycleStatus,
    CycleSummary, DriveOutcome, LiquidColor, SessionCycleController, SessionKind, SessionPlan,
    SkipCuePolicy, TickDriver, TickOutcome,
};
