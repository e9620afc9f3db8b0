//! One-second countdown source for a [`SessionCycleController`].
//!
//! The driver only ticks while the controller is running. Pausing stops the
//! interval outright, and resuming restarts the period, so a partial second
//! before a pause is never counted twice.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::cycle::{CycleStatus, CycleSummary, SessionCycleController};
use crate::error::CycleError;

/// User input forwarded to the controller between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    /// Pause when running, resume when paused.
    Toggle,
    Skip,
    Reset,
    VisibilityRegained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    Finished(CycleSummary),
    Reset,
    /// Paused with the command channel closed; nothing can resume the cycle.
    Detached,
}

#[derive(Debug, Clone, Copy)]
pub struct TickDriver {
    period: Duration,
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl TickDriver {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run the controller until its cycle finishes or is reset.
    pub async fn drive(
        &self,
        controller: &mut SessionCycleController,
        mut commands: mpsc::Receiver<ControlCommand>,
    ) -> DriveOutcome {
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut commands_open = true;

        loop {
            match controller.status() {
                CycleStatus::Finished => {
                    let summary = controller.summary().unwrap_or(CycleSummary {
                        completed_work_units: 0,
                        total_work_minutes: 0,
                    });
                    return DriveOutcome::Finished(summary);
                }
                CycleStatus::Idle => return DriveOutcome::Reset,
                CycleStatus::Paused if !commands_open => return DriveOutcome::Detached,
                CycleStatus::Running | CycleStatus::Paused => {}
            }
            let running = controller.status() == CycleStatus::Running;

            tokio::select! {
                _ = interval.tick(), if running => {
                    if let Err(e) = controller.tick() {
                        warn!(error = %e, "tick rejected");
                    }
                }
                command = commands.recv(), if commands_open => {
                    let Some(command) = command else {
                        debug!("command channel closed");
                        commands_open = false;
                        continue;
                    };
                    let was_running = controller.status() == CycleStatus::Running;
                    if let Err(e) = apply(controller, command) {
                        warn!(?command, error = %e, "command rejected");
                    }
                    if !was_running && controller.status() == CycleStatus::Running {
                        interval.reset();
                    }
                }
            }
        }
    }
}

/// Apply one command to the controller.
pub fn apply(
    controller: &mut SessionCycleController,
    command: ControlCommand,
) -> Result<(), CycleError> {
    debug!(?command, status = %controller.status(), "applying command");
    match command {
        ControlCommand::Pause => controller.pause(),
        ControlCommand::Resume => controller.resume(),
        ControlCommand::Toggle => match controller.status() {
            CycleStatus::Paused => controller.resume(),
            _ => controller.pause(),
        },
        ControlCommand::Skip => controller.skip(),
        ControlCommand::Reset => {
            controller.reset();
            Ok(())
        }
        ControlCommand::VisibilityRegained => {
            controller.visibility_regained();
            Ok(())
        }
    }
}
