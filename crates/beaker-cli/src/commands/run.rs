use std::future::Future;
use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use beaker_core::{ControlCommand, DriveOutcome, SessionCycleController, TickDriver};

use super::plan::{build_plan, PlanOverrides};
use super::terminal::{json_effects, text_effects};

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub overrides: PlanOverrides,
    /// Emit events as JSON lines instead of a progress bar
    #[arg(long)]
    pub json: bool,
    /// Length of one tick in milliseconds
    #[arg(long, default_value_t = 1000, hide = true)]
    pub tick_ms: u64,
}

/// Map one line of keyboard input to a command.
pub fn parse_command(line: &str) -> Option<ControlCommand> {
    match line.trim() {
        "" | "t" | "toggle" => Some(ControlCommand::Toggle),
        "p" | "pause" => Some(ControlCommand::Pause),
        "r" | "resume" => Some(ControlCommand::Resume),
        "s" | "skip" => Some(ControlCommand::Skip),
        "q" | "reset" | "quit" => Some(ControlCommand::Reset),
        "v" | "wake" => Some(ControlCommand::VisibilityRegained),
        _ => None,
    }
}

/// Forward keyboard lines and the interrupt signal to the driver. The
/// interrupt keeps being watched after `input` reaches end of file.
async fn forward_input<R, I>(input: R, interrupt: I, tx: mpsc::Sender<ControlCommand>)
where
    R: AsyncBufRead + Unpin,
    I: Future<Output = ()>,
{
    let mut lines = input.lines();
    let mut input_open = true;
    tokio::pin!(interrupt);
    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Ok(Some(line)) = line else {
                    debug!("input closed");
                    input_open = false;
                    continue;
                };
                match parse_command(&line) {
                    Some(command) => {
                        if tx.send(command).await.is_err() {
                            return;
                        }
                    }
                    None => eprintln!("keys: enter/t toggle, s skip, q reset, v wake"),
                }
            }
            _ = &mut interrupt => {
                debug!("interrupted");
                let _ = tx.send(ControlCommand::Reset).await;
                return;
            }
        }
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        debug!(error = %e, "no interrupt handler");
        std::future::pending::<()>().await;
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (settings, plan) = build_plan(&args.overrides)?;
    let effects = if args.json {
        json_effects()
    } else {
        text_effects()
    };
    let mut controller = SessionCycleController::new(settings.cycle_options(), effects);

    if !args.json {
        println!(
            "{} sessions, {} min of work. enter: pause/resume  s: skip  q: reset",
            plan.len(),
            plan.total_work_minutes()
        );
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let driver = TickDriver::new(Duration::from_millis(args.tick_ms.max(1)));

    let outcome = runtime.block_on(async {
        controller.start(plan)?;
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(forward_input(
            BufReader::new(tokio::io::stdin()),
            ctrl_c(),
            tx,
        ));
        Ok::<_, Box<dyn std::error::Error>>(driver.drive(&mut controller, rx).await)
    })?;
    // Stdin reads block a runtime thread; don't wait for them.
    runtime.shutdown_background();

    match outcome {
        DriveOutcome::Finished(_) => {}
        DriveOutcome::Reset => {
            if !args.json {
                println!("cycle reset");
            }
        }
        DriveOutcome::Detached => return Err("input closed while paused".into()),
    }
    Ok(())
}
