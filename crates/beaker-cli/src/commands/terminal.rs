//! Terminal stand-ins for the display, sound and wake-lock collaborators.

use std::io::Write;

use beaker_core::effects::{Noop, WakeLockHandle};
use beaker_core::{
    AudioCue, Cue, CycleStatus, EffectError, Effects, EventRecorder, LiquidColor, RenderSink,
    SessionKind, WakeLock,
};
use tracing::debug;

const BAR_WIDTH: usize = 24;

/// One-line progress display redrawn in place.
pub struct TextRender {
    total_sessions: usize,
}

impl TextRender {
    pub fn new() -> Self {
        Self { total_sessions: 0 }
    }
}

pub fn liquid_bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

impl RenderSink for TextRender {
    fn on_tick(&mut self, kind: SessionKind, fraction: f64, clock: &str) {
        let mut out = std::io::stdout();
        let _ = write!(out, "\r{:<12} [{}] {}", kind.label(), liquid_bar(fraction), clock);
        let _ = out.flush();
    }

    fn on_session_start(
        &mut self,
        kind: SessionKind,
        index: usize,
        total_sessions: usize,
        liquid: LiquidColor,
    ) {
        self.total_sessions = total_sessions;
        println!(
            "\n▶ {}/{} {} ({})",
            index + 1,
            total_sessions,
            kind.label(),
            liquid.css()
        );
    }

    fn on_session_complete(&mut self, index: usize, kind: SessionKind) {
        println!("\n✓ {}/{} {} done", index + 1, self.total_sessions, kind.label());
    }

    fn on_finished(&mut self, completed_work_units: u32, total_work_minutes: u64) {
        println!("\nAll done: {completed_work_units} work units, {total_work_minutes} min of work.");
    }

    fn on_status(&mut self, status: CycleStatus) {
        println!("\n[{status}]");
    }
}

/// Prints every recorded event as one JSON line.
pub struct JsonLines {
    recorder: EventRecorder,
}

impl JsonLines {
    fn flush(&self) {
        for event in self.recorder.drain() {
            if let Ok(line) = serde_json::to_string(&event) {
                println!("{line}");
            }
        }
    }
}

impl RenderSink for JsonLines {
    fn on_tick(&mut self, kind: SessionKind, fraction: f64, clock: &str) {
        self.recorder.on_tick(kind, fraction, clock);
        self.flush();
    }

    fn on_session_start(
        &mut self,
        kind: SessionKind,
        index: usize,
        total_sessions: usize,
        liquid: LiquidColor,
    ) {
        self.recorder
            .on_session_start(kind, index, total_sessions, liquid);
        self.flush();
    }

    fn on_session_complete(&mut self, index: usize, kind: SessionKind) {
        self.recorder.on_session_complete(index, kind);
        self.flush();
    }

    fn on_finished(&mut self, completed_work_units: u32, total_work_minutes: u64) {
        self.recorder
            .on_finished(completed_work_units, total_work_minutes);
        self.flush();
    }

    fn on_status(&mut self, status: CycleStatus) {
        self.recorder.on_status(status);
        self.flush();
    }
}

/// Rings the terminal bell.
pub struct Bell;

impl AudioCue for Bell {
    fn play_cue(&mut self, cue: Cue) -> Result<(), EffectError> {
        debug!(?cue, "bell");
        let mut out = std::io::stdout();
        out.write_all(b"\x07")
            .and_then(|_| out.flush())
            .map_err(|e| EffectError::Failed {
                effect: "audio",
                message: e.to_string(),
            })
    }
}

/// A terminal cannot keep the screen awake; this only tracks the handle.
#[derive(Default)]
pub struct SessionWakeLock {
    issued: u64,
    held: Option<WakeLockHandle>,
}

impl WakeLock for SessionWakeLock {
    fn acquire(&mut self) -> Result<WakeLockHandle, EffectError> {
        self.issued += 1;
        let handle = WakeLockHandle(self.issued);
        self.held = Some(handle);
        debug!(handle = handle.0, "wake lock held");
        Ok(handle)
    }

    fn release(&mut self, handle: WakeLockHandle) -> Result<(), EffectError> {
        if self.held.take() != Some(handle) {
            return Err(EffectError::Failed {
                effect: "wake lock",
                message: format!("handle {} is not held", handle.0),
            });
        }
        debug!(handle = handle.0, "wake lock released");
        Ok(())
    }
}

pub fn text_effects() -> Effects {
    Effects {
        render: Box::new(TextRender::new()),
        audio: Box::new(Bell),
        haptics: Box::new(Noop),
        wake_lock: Box::new(SessionWakeLock::default()),
    }
}

/// Everything goes through one recorder and comes out as JSON lines.
pub fn json_effects() -> Effects {
    let recorder = EventRecorder::new();
    Effects {
        render: Box::new(JsonLines {
            recorder: recorder.clone(),
        }),
        ..Effects::recorded(&recorder)
    }
}
