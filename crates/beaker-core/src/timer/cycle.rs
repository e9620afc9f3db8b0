//! Session-cycle controller.
//!
//! The controller is a tick-driven state machine. It owns no timer: the
//! caller (see [`super::driver`]) invokes `tick()` once per elapsed second
//! while the cycle is running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> Finished
//!   ^________________________________|  (reset, from any state)
//! ```
//!
//! Between two sessions the cycle *settles*: the next session is already
//! loaded but only begins once the settle delay has been counted down by
//! further ticks. Reset and skip drop a pending settle on the spot.
//!
//! ## Usage
//!
//! ```ignore
//! let plan = generate(&config)?;
//! let mut cycle = SessionCycleController::new(CycleOptions::default(), Effects::silent());
//! cycle.start(plan)?;
//! // Once per second:
//! cycle.tick()?;
//! ```

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::liquid::{completion_fraction, format_clock, LiquidColor};
use super::plan::{SessionKind, SessionPlan};
use crate::effects::{Cue, Effects, WakeLockHandle, DEFAULT_VIBRATION_PATTERN};
use crate::error::CycleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleStatus {
    Idle,
    Running,
    Paused,
    Finished,
}

impl std::fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CycleStatus::Idle => "idle",
            CycleStatus::Running => "running",
            CycleStatus::Paused => "paused",
            CycleStatus::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// Whether a skipped session plays its end cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipCuePolicy {
    #[default]
    Silent,
    SameAsCompletion,
}

/// Tunables for a controller. Durations are in whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleOptions {
    /// Pause between a session running out and the next one starting.
    pub settle_secs: u64,
    /// Pause between a skip and the next session starting.
    pub skip_settle_secs: u64,
    pub skip_cue: SkipCuePolicy,
    pub cues_enabled: bool,
    pub vibration_enabled: bool,
    pub vibration_pattern_ms: Vec<u32>,
}

impl Default for CycleOptions {
    fn default() -> Self {
        Self {
            settle_secs: 3,
            skip_settle_secs: 1,
            skip_cue: SkipCuePolicy::Silent,
            cues_enabled: true,
            vibration_enabled: true,
            vibration_pattern_ms: DEFAULT_VIBRATION_PATTERN.to_vec(),
        }
    }
}

/// Summary reported once the last session of a plan is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub completed_work_units: u32,
    pub total_work_minutes: u64,
}

/// What a single `tick()` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown moved; the session is still going.
    Counted { remaining_secs: u64 },
    /// Waiting for the next session to begin.
    Settling { secs_left: u64 },
    SessionStarted { index: usize },
    SessionCompleted { index: usize, kind: SessionKind },
    Finished(CycleSummary),
}

/// Read-only view for renderers and mirrored displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    pub status: CycleStatus,
    pub kind: Option<SessionKind>,
    pub index: usize,
    pub total_sessions: usize,
    pub remaining_secs: u64,
    pub session_total_secs: u64,
    pub fraction: f64,
    pub clock: String,
    pub settling: bool,
    pub completed_work_units: u32,
    pub liquid_hue: Option<u16>,
}

/// Mutable state of a loaded cycle. `current_index == plan.len()` once the
/// plan is exhausted.
#[derive(Debug, Clone)]
struct CycleState {
    plan: SessionPlan,
    current_index: usize,
    session_total_secs: u64,
    remaining_secs: u64,
    status: CycleStatus,
    completed_work_units: u32,
    /// Seconds left before the loaded session begins.
    settle_left: Option<u64>,
}

impl CycleState {
    fn current_kind(&self) -> Option<SessionKind> {
        self.plan.get(self.current_index)
    }

    /// Load the duration of the session at `current_index`.
    fn load_current(&mut self) {
        let secs = self
            .current_kind()
            .map(|k| self.plan.duration_secs(k))
            .unwrap_or(0);
        self.session_total_secs = secs;
        self.remaining_secs = secs;
    }
}

pub struct SessionCycleController {
    cycle: Option<CycleState>,
    options: CycleOptions,
    effects: Effects,
    rng: Pcg32,
    liquid: Option<LiquidColor>,
    wake_lock: Option<WakeLockHandle>,
}

impl SessionCycleController {
    pub fn new(options: CycleOptions, effects: Effects) -> Self {
        Self::with_rng(options, effects, Pcg32::from_entropy())
    }

    /// Deterministic liquid colors, for tests and replays.
    pub fn with_seed(options: CycleOptions, effects: Effects, seed: u64) -> Self {
        Self::with_rng(options, effects, Pcg32::seed_from_u64(seed))
    }

    fn with_rng(options: CycleOptions, effects: Effects, rng: Pcg32) -> Self {
        debug!(?options, "SessionCycleController::new");
        Self {
            cycle: None,
            options,
            effects,
            rng,
            liquid: None,
            wake_lock: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> CycleStatus {
        self.cycle
            .as_ref()
            .map(|c| c.status)
            .unwrap_or(CycleStatus::Idle)
    }

    pub fn options(&self) -> &CycleOptions {
        &self.options
    }

    pub fn plan(&self) -> Option<&SessionPlan> {
        self.cycle.as_ref().map(|c| &c.plan)
    }

    pub fn current_index(&self) -> usize {
        self.cycle.as_ref().map(|c| c.current_index).unwrap_or(0)
    }

    pub fn current_kind(&self) -> Option<SessionKind> {
        self.cycle.as_ref().and_then(CycleState::current_kind)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.cycle.as_ref().map(|c| c.remaining_secs).unwrap_or(0)
    }

    pub fn session_total_secs(&self) -> u64 {
        self.cycle.as_ref().map(|c| c.session_total_secs).unwrap_or(0)
    }

    pub fn completed_work_units(&self) -> u32 {
        self.cycle
            .as_ref()
            .map(|c| c.completed_work_units)
            .unwrap_or(0)
    }

    pub fn is_settling(&self) -> bool {
        self.cycle
            .as_ref()
            .is_some_and(|c| c.settle_left.is_some())
    }

    pub fn holds_wake_lock(&self) -> bool {
        self.wake_lock.is_some()
    }

    /// Beaker fill level for the current session, `0.0..=1.0`.
    pub fn completion_fraction(&self) -> f64 {
        match self.current_kind() {
            Some(kind) => {
                completion_fraction(kind, self.remaining_secs(), self.session_total_secs())
            }
            None => 0.0,
        }
    }

    pub fn summary(&self) -> Option<CycleSummary> {
        let cycle = self.cycle.as_ref()?;
        Some(CycleSummary {
            completed_work_units: cycle.completed_work_units,
            total_work_minutes: cycle.plan.work_minutes_for(cycle.completed_work_units),
        })
    }

    pub fn snapshot(&self) -> CycleSnapshot {
        let remaining_secs = self.remaining_secs();
        CycleSnapshot {
            status: self.status(),
            kind: self.current_kind(),
            index: self.current_index(),
            total_sessions: self.plan().map(SessionPlan::len).unwrap_or(0),
            remaining_secs,
            session_total_secs: self.session_total_secs(),
            fraction: self.completion_fraction(),
            clock: format_clock(remaining_secs),
            settling: self.is_settling(),
            completed_work_units: self.completed_work_units(),
            liquid_hue: self.liquid.map(LiquidColor::hue),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, plan: SessionPlan) -> Result<(), CycleError> {
        let status = self.status();
        if status != CycleStatus::Idle {
            return Err(CycleError::AlreadyStarted { status });
        }
        info!(sessions = plan.len(), "starting cycle");
        let mut cycle = CycleState {
            plan,
            current_index: 0,
            session_total_secs: 0,
            remaining_secs: 0,
            status: CycleStatus::Running,
            completed_work_units: 0,
            settle_left: None,
        };
        cycle.load_current();
        self.cycle = Some(cycle);
        self.begin_session();
        Ok(())
    }

    /// Advance one second. Only valid while running.
    pub fn tick(&mut self) -> Result<TickOutcome, CycleError> {
        let cycle = self.require("tick", &[CycleStatus::Running])?;

        if let Some(left) = cycle.settle_left {
            let left = left.saturating_sub(1);
            if left > 0 {
                cycle.settle_left = Some(left);
                return Ok(TickOutcome::Settling { secs_left: left });
            }
            cycle.settle_left = None;
            let index = cycle.current_index;
            self.begin_session();
            return Ok(TickOutcome::SessionStarted { index });
        }

        cycle.remaining_secs = cycle.remaining_secs.saturating_sub(1);
        let remaining_secs = cycle.remaining_secs;
        let total = cycle.session_total_secs;
        let Some(kind) = cycle.current_kind() else {
            return Ok(TickOutcome::Counted { remaining_secs });
        };

        if remaining_secs > 0 {
            self.effects.render.on_tick(
                kind,
                completion_fraction(kind, remaining_secs, total),
                &format_clock(remaining_secs),
            );
            return Ok(TickOutcome::Counted { remaining_secs });
        }
        Ok(self.complete_current(false))
    }

    pub fn pause(&mut self) -> Result<(), CycleError> {
        let cycle = self.require("pause", &[CycleStatus::Running])?;
        cycle.status = CycleStatus::Paused;
        debug!(remaining = cycle.remaining_secs, "paused");
        self.release_wake_lock();
        self.effects.render.on_status(CycleStatus::Paused);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), CycleError> {
        let cycle = self.require("resume", &[CycleStatus::Paused])?;
        cycle.status = CycleStatus::Running;
        debug!(remaining = cycle.remaining_secs, "resumed");
        self.acquire_wake_lock();
        self.effects.render.on_status(CycleStatus::Running);
        Ok(())
    }

    /// End the current session now, with the same bookkeeping as running
    /// out. A pending settle is dropped first, so skipping between two
    /// sessions skips the one that was about to begin.
    pub fn skip(&mut self) -> Result<(), CycleError> {
        let cycle = self.require("skip", &[CycleStatus::Running, CycleStatus::Paused])?;
        let was_paused = cycle.status == CycleStatus::Paused;
        let is_last = cycle.current_index + 1 >= cycle.plan.len();
        cycle.status = CycleStatus::Running;
        if cycle.settle_left.take().is_some() {
            debug!(index = cycle.current_index, "skip cancels settle");
        }

        if was_paused && !is_last {
            self.effects.render.on_status(CycleStatus::Running);
        }
        let outcome = self.complete_current(true);
        if was_paused && !matches!(outcome, TickOutcome::Finished(_)) {
            self.acquire_wake_lock();
        }
        Ok(())
    }

    /// Drop the plan and return to idle. Valid from any state.
    pub fn reset(&mut self) {
        if self.cycle.take().is_some() {
            info!("cycle reset");
        }
        self.liquid = None;
        self.release_wake_lock();
        self.effects.render.on_status(CycleStatus::Idle);
    }

    /// Retry the wake lock after the display becomes visible again.
    /// Returns whether a lock is held afterwards.
    pub fn visibility_regained(&mut self) -> bool {
        if self.status() == CycleStatus::Running && self.wake_lock.is_none() {
            self.acquire_wake_lock();
        }
        self.wake_lock.is_some()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require(
        &mut self,
        operation: &'static str,
        allowed: &[CycleStatus],
    ) -> Result<&mut CycleState, CycleError> {
        match self.cycle.as_mut() {
            Some(cycle) if allowed.contains(&cycle.status) => Ok(cycle),
            Some(cycle) => Err(CycleError::InvalidTransition {
                operation,
                status: cycle.status,
            }),
            None => Err(CycleError::InvalidTransition {
                operation,
                status: CycleStatus::Idle,
            }),
        }
    }

    /// Side effects of a session beginning. The session's duration must
    /// already be loaded.
    fn begin_session(&mut self) {
        let Some(cycle) = self.cycle.as_ref() else {
            return;
        };
        let Some(kind) = cycle.current_kind() else {
            return;
        };
        let index = cycle.current_index;
        let total_sessions = cycle.plan.len();
        let liquid = LiquidColor::random(&mut self.rng);
        self.liquid = Some(liquid);

        info!(index, ?kind, secs = cycle.session_total_secs, "session started");
        self.play_cue(Cue::SessionStart);
        if self.wake_lock.is_none() {
            self.acquire_wake_lock();
        }
        self.effects
            .render
            .on_session_start(kind, index, total_sessions, liquid);
    }

    /// Close the current session and move on to the next one (or finish).
    fn complete_current(&mut self, skipped: bool) -> TickOutcome {
        let Some(cycle) = self.cycle.as_mut() else {
            return TickOutcome::Counted { remaining_secs: 0 };
        };
        let index = cycle.current_index;
        let Some(kind) = cycle.current_kind() else {
            return TickOutcome::Counted { remaining_secs: 0 };
        };

        if kind == SessionKind::Work {
            cycle.completed_work_units += 1;
        }
        cycle.current_index += 1;
        let exhausted = cycle.current_index >= cycle.plan.len();
        debug!(index, ?kind, skipped, "session completed");

        if !skipped || self.options.skip_cue == SkipCuePolicy::SameAsCompletion {
            self.play_cue(Cue::ending(kind));
        }
        self.vibrate();
        self.effects.render.on_session_complete(index, kind);

        if exhausted {
            return TickOutcome::Finished(self.finish());
        }

        let delay = if skipped {
            self.options.skip_settle_secs
        } else {
            self.options.settle_secs
        };
        if let Some(cycle) = self.cycle.as_mut() {
            cycle.load_current();
            if delay > 0 {
                cycle.settle_left = Some(delay);
            }
        }
        if delay == 0 {
            self.begin_session();
        }
        TickOutcome::SessionCompleted { index, kind }
    }

    fn finish(&mut self) -> CycleSummary {
        let summary = self.summary().unwrap_or(CycleSummary {
            completed_work_units: 0,
            total_work_minutes: 0,
        });
        if let Some(cycle) = self.cycle.as_mut() {
            cycle.status = CycleStatus::Finished;
            cycle.settle_left = None;
            cycle.session_total_secs = 0;
            cycle.remaining_secs = 0;
        }
        info!(
            work_units = summary.completed_work_units,
            minutes = summary.total_work_minutes,
            "cycle finished"
        );
        self.release_wake_lock();
        self.effects
            .render
            .on_finished(summary.completed_work_units, summary.total_work_minutes);
        summary
    }

    fn play_cue(&mut self, cue: Cue) {
        if !self.options.cues_enabled {
            return;
        }
        if let Err(e) = self.effects.audio.play_cue(cue) {
            warn!(?cue, error = %e, "audio cue failed");
        }
    }

    fn vibrate(&mut self) {
        if !self.options.vibration_enabled || self.options.vibration_pattern_ms.is_empty() {
            return;
        }
        if let Err(e) = self.effects.haptics.vibrate(&self.options.vibration_pattern_ms) {
            debug!(error = %e, "vibration skipped");
        }
    }

    fn acquire_wake_lock(&mut self) {
        if self.wake_lock.is_some() {
            return;
        }
        match self.effects.wake_lock.acquire() {
            Ok(handle) => self.wake_lock = Some(handle),
            Err(e) => warn!(error = %e, "could not acquire wake lock; continuing without it"),
        }
    }

    fn release_wake_lock(&mut self) {
        if let Some(handle) = self.wake_lock.take() {
            if let Err(e) = self.effects.wake_lock.release(handle) {
                warn!(error = %e, "wake lock release failed");
            }
        }
    }
}

impl std::fmt::Debug for SessionCycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCycleController")
            .field("cycle", &self.cycle)
            .field("options", &self.options)
            .field("wake_lock", &self.wake_lock)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EventRecorder;
    use crate::events::Event;
    use crate::timer::plan::{generate, Configuration};

    fn scenario_a() -> SessionPlan {
        generate(&Configuration {
            total_minutes_budget: 50,
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            work_units_per_long_break: 4,
        })
        .unwrap()
    }

    fn controller() -> (SessionCycleController, EventRecorder) {
        let recorder = EventRecorder::new();
        let cycle = SessionCycleController::with_seed(
            CycleOptions::default(),
            Effects::recorded(&recorder),
            42,
        );
        (cycle, recorder)
    }

    fn tick_n(cycle: &mut SessionCycleController, n: usize) {
        for _ in 0..n {
            cycle.tick().unwrap();
        }
    }

    #[test]
    fn start_loads_first_session() {
        let (mut cycle, recorder) = controller();
        cycle.start(scenario_a()).unwrap();
        assert_eq!(cycle.status(), CycleStatus::Running);
        assert_eq!(cycle.current_index(), 0);
        assert_eq!(cycle.remaining_secs(), 1500);
        assert_eq!(cycle.session_total_secs(), 1500);
        assert_eq!(recorder.cues(), vec![Cue::SessionStart]);
        assert!(recorder.holds_wake_lock());
        assert_eq!(recorder.count("session_started"), 1);
    }

    #[test]
    fn start_twice_is_rejected() {
        let (mut cycle, _) = controller();
        cycle.start(scenario_a()).unwrap();
        assert_eq!(
            cycle.start(scenario_a()),
            Err(CycleError::AlreadyStarted {
                status: CycleStatus::Running
            })
        );
    }

    #[test]
    fn tick_while_idle_or_paused_is_invalid() {
        let (mut cycle, recorder) = controller();
        assert_eq!(
            cycle.tick(),
            Err(CycleError::InvalidTransition {
                operation: "tick",
                status: CycleStatus::Idle
            })
        );
        cycle.start(scenario_a()).unwrap();
        cycle.pause().unwrap();
        recorder.drain();
        assert!(cycle.tick().is_err());
        assert_eq!(cycle.remaining_secs(), 1500);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn pause_resume_preserves_countdown() {
        let (mut cycle, recorder) = controller();
        cycle.start(scenario_a()).unwrap();
        tick_n(&mut cycle, 90);
        let before = (
            cycle.remaining_secs(),
            cycle.current_index(),
            cycle.session_total_secs(),
        );
        cycle.pause().unwrap();
        assert!(!recorder.holds_wake_lock());
        cycle.resume().unwrap();
        assert!(recorder.holds_wake_lock());
        assert_eq!(
            (
                cycle.remaining_secs(),
                cycle.current_index(),
                cycle.session_total_secs()
            ),
            before
        );
    }

    #[test]
    fn pause_while_idle_is_invalid() {
        let (mut cycle, _) = controller();
        assert!(matches!(
            cycle.pause(),
            Err(CycleError::InvalidTransition { operation: "pause", .. })
        ));
        assert!(cycle.resume().is_err());
        assert!(cycle.skip().is_err());
    }

    #[test]
    fn natural_completion_settles_then_starts_break() {
        let (mut cycle, recorder) = controller();
        cycle.start(scenario_a()).unwrap();
        tick_n(&mut cycle, 1499);
        assert_eq!(
            cycle.tick().unwrap(),
            TickOutcome::SessionCompleted {
                index: 0,
                kind: SessionKind::Work
            }
        );
        assert_eq!(cycle.completed_work_units(), 1);
        assert!(cycle.is_settling());
        assert_eq!(cycle.tick().unwrap(), TickOutcome::Settling { secs_left: 2 });
        assert_eq!(cycle.tick().unwrap(), TickOutcome::Settling { secs_left: 1 });
        assert_eq!(
            cycle.tick().unwrap(),
            TickOutcome::SessionStarted { index: 1 }
        );
        assert_eq!(cycle.status(), CycleStatus::Running);
        assert_eq!(cycle.current_kind(), Some(SessionKind::ShortBreak));
        assert_eq!(cycle.remaining_secs(), 300);
        assert_eq!(
            recorder.cues(),
            vec![Cue::SessionStart, Cue::WorkEnd, Cue::SessionStart]
        );
        assert_eq!(recorder.count("vibrated"), 1);
    }

    #[test]
    fn skip_mid_work_counts_unit() {
        let (mut cycle, recorder) = controller();
        cycle.start(scenario_a()).unwrap();
        tick_n(&mut cycle, 900);
        assert_eq!(cycle.remaining_secs(), 600);
        cycle.skip().unwrap();
        assert_eq!(cycle.completed_work_units(), 1);
        assert_eq!(cycle.current_index(), 1);
        assert!(cycle.is_settling());
        // Silent by default.
        assert_eq!(recorder.cues(), vec![Cue::SessionStart]);
        assert_eq!(recorder.count("vibrated"), 1);
        assert_eq!(
            cycle.tick().unwrap(),
            TickOutcome::SessionStarted { index: 1 }
        );
    }

    #[test]
    fn skip_can_play_completion_cue() {
        let recorder = EventRecorder::new();
        let options = CycleOptions {
            skip_cue: SkipCuePolicy::SameAsCompletion,
            ..CycleOptions::default()
        };
        let mut cycle =
            SessionCycleController::with_seed(options, Effects::recorded(&recorder), 1);
        cycle.start(scenario_a()).unwrap();
        cycle.skip().unwrap();
        assert_eq!(recorder.cues(), vec![Cue::SessionStart, Cue::WorkEnd]);
    }

    #[test]
    fn skip_while_paused_resumes_into_next_session() {
        let (mut cycle, recorder) = controller();
        cycle.start(scenario_a()).unwrap();
        cycle.pause().unwrap();
        cycle.skip().unwrap();
        assert_eq!(cycle.status(), CycleStatus::Running);
        assert!(recorder.holds_wake_lock());
        cycle.tick().unwrap();
        assert_eq!(cycle.current_kind(), Some(SessionKind::ShortBreak));
    }

    #[test]
    fn skip_during_settle_skips_loaded_session() {
        let (mut cycle, recorder) = controller();
        cycle.start(scenario_a()).unwrap();
        tick_n(&mut cycle, 1500);
        assert!(cycle.is_settling());
        assert_eq!(cycle.current_index(), 1);

        cycle.skip().unwrap();
        assert_eq!(cycle.current_index(), 2);
        assert_eq!(cycle.current_kind(), Some(SessionKind::Work));
        assert_eq!(cycle.completed_work_units(), 1);
        assert_eq!(recorder.count("session_completed"), 2);
        // The skip settle replaces the natural one.
        assert!(cycle.is_settling());
        assert_eq!(
            cycle.tick().unwrap(),
            TickOutcome::SessionStarted { index: 2 }
        );
        assert_eq!(cycle.remaining_secs(), 1500);
    }

    #[test]
    fn skip_last_session_while_paused_finishes_without_resuming() {
        let (mut cycle, recorder) = controller();
        cycle.start(scenario_a()).unwrap();
        cycle.skip().unwrap();
        cycle.skip().unwrap();
        assert_eq!(cycle.current_index(), 2);
        cycle.pause().unwrap();
        recorder.drain();

        cycle.skip().unwrap();
        assert_eq!(cycle.status(), CycleStatus::Finished);
        assert_eq!(cycle.completed_work_units(), 2);
        assert!(!recorder.holds_wake_lock());
        let running = recorder
            .events()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    Event::StatusChanged {
                        status: CycleStatus::Running,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(running, 0);
        assert_eq!(recorder.count("cycle_finished"), 1);
    }

    #[test]
    fn pause_during_settle_holds_the_delay() {
        let (mut cycle, _) = controller();
        cycle.start(scenario_a()).unwrap();
        tick_n(&mut cycle, 1501);
        assert!(cycle.snapshot().settling);
        cycle.pause().unwrap();
        assert!(cycle.tick().is_err());
        assert!(cycle.is_settling());
        cycle.resume().unwrap();
        assert_eq!(cycle.tick().unwrap(), TickOutcome::Settling { secs_left: 1 });
        assert_eq!(
            cycle.tick().unwrap(),
            TickOutcome::SessionStarted { index: 1 }
        );
        assert_eq!(cycle.current_kind(), Some(SessionKind::ShortBreak));
    }

    #[test]
    fn reaching_zero_completes_without_a_final_tick_render() {
        let (mut cycle, recorder) = controller();
        cycle.start(scenario_a()).unwrap();
        tick_n(&mut cycle, 1500);
        assert_eq!(recorder.count("tick"), 1499);
        let last_clock = recorder.events().into_iter().rev().find_map(|e| match e {
            Event::Tick { clock, .. } => Some(clock),
            _ => None,
        });
        assert_eq!(last_clock.as_deref(), Some("00:01"));
    }

    #[test]
    fn reset_cancels_pending_settle() {
        let (mut cycle, recorder) = controller();
        cycle.start(scenario_a()).unwrap();
        tick_n(&mut cycle, 1500);
        assert!(cycle.is_settling());
        cycle.reset();
        assert_eq!(cycle.status(), CycleStatus::Idle);
        assert!(cycle.plan().is_none());
        assert!(!recorder.holds_wake_lock());
        recorder.drain();
        assert!(cycle.tick().is_err());
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn finishes_exactly_once() {
        let (mut cycle, recorder) = controller();
        cycle.start(scenario_a()).unwrap();
        let mut finished = 0;
        while cycle.status() == CycleStatus::Running {
            if let TickOutcome::Finished(summary) = cycle.tick().unwrap() {
                finished += 1;
                assert_eq!(summary.completed_work_units, 2);
                assert_eq!(summary.total_work_minutes, 50);
            }
        }
        assert_eq!(finished, 1);
        assert_eq!(cycle.status(), CycleStatus::Finished);
        assert_eq!(cycle.current_index(), 3);
        assert_eq!(recorder.count("cycle_finished"), 1);
        assert!(!recorder.holds_wake_lock());
        assert!(cycle.tick().is_err());
        assert_eq!(
            cycle.start(scenario_a()),
            Err(CycleError::AlreadyStarted {
                status: CycleStatus::Finished
            })
        );
    }

    #[test]
    fn wake_lock_failure_does_not_stall_cycle() {
        let recorder = EventRecorder::new();
        recorder.deny_wake_lock(true);
        recorder.mute_audio(true);
        let mut cycle = SessionCycleController::with_seed(
            CycleOptions::default(),
            Effects::recorded(&recorder),
            3,
        );
        cycle.start(scenario_a()).unwrap();
        assert!(!cycle.holds_wake_lock());
        tick_n(&mut cycle, 10);
        assert_eq!(cycle.remaining_secs(), 1490);

        recorder.deny_wake_lock(false);
        assert!(cycle.visibility_regained());
        assert!(recorder.holds_wake_lock());
    }

    #[test]
    fn visibility_regained_ignored_while_paused() {
        let (mut cycle, _) = controller();
        cycle.start(scenario_a()).unwrap();
        cycle.pause().unwrap();
        assert!(!cycle.visibility_regained());
    }

    #[test]
    fn zero_settle_starts_next_session_on_same_tick() {
        let recorder = EventRecorder::new();
        let options = CycleOptions {
            settle_secs: 0,
            ..CycleOptions::default()
        };
        let mut cycle =
            SessionCycleController::with_seed(options, Effects::recorded(&recorder), 9);
        cycle.start(scenario_a()).unwrap();
        tick_n(&mut cycle, 1500);
        assert!(!cycle.is_settling());
        assert_eq!(cycle.current_kind(), Some(SessionKind::ShortBreak));
        assert_eq!(recorder.count("session_started"), 2);
    }

    #[test]
    fn snapshot_mirrors_state() {
        let (mut cycle, _) = controller();
        let idle = cycle.snapshot();
        assert_eq!(idle.status, CycleStatus::Idle);
        assert_eq!(idle.kind, None);

        cycle.start(scenario_a()).unwrap();
        tick_n(&mut cycle, 60);
        let snap = cycle.snapshot();
        assert_eq!(snap.status, CycleStatus::Running);
        assert_eq!(snap.kind, Some(SessionKind::Work));
        assert_eq!(snap.remaining_secs, 1440);
        assert_eq!(snap.session_total_secs, 1500);
        assert_eq!(snap.total_sessions, 3);
        assert_eq!(snap.clock, "24:00");
        assert!((snap.fraction - 0.96).abs() < 1e-9);
        assert!(snap.liquid_hue.is_some());
    }

    #[test]
    fn muted_cues_and_vibration() {
        let recorder = EventRecorder::new();
        let options = CycleOptions {
            cues_enabled: false,
            vibration_enabled: false,
            ..CycleOptions::default()
        };
        let mut cycle =
            SessionCycleController::with_seed(options, Effects::recorded(&recorder), 5);
        cycle.start(scenario_a()).unwrap();
        cycle.skip().unwrap();
        assert!(recorder.cues().is_empty());
        assert_eq!(recorder.count("vibrated"), 0);
    }
}
