use clap::Args;
use serde::Serialize;

use beaker_core::{generate, SessionKind, SessionPlan, Settings};

/// Plan inputs; anything left out comes from the settings file.
#[derive(Args, Debug, Clone, Default)]
pub struct PlanOverrides {
    /// Total work budget in hours
    #[arg(long)]
    pub hours: Option<u32>,
    /// Work session length in minutes
    #[arg(long)]
    pub work: Option<u32>,
    /// Short break length in minutes
    #[arg(long)]
    pub short_break: Option<u32>,
    /// Long break length in minutes
    #[arg(long)]
    pub long_break: Option<u32>,
    /// Work sessions per long break
    #[arg(long)]
    pub every: Option<u32>,
}

impl PlanOverrides {
    pub fn apply(&self, settings: &mut Settings) {
        let plan = &mut settings.plan;
        if let Some(v) = self.hours {
            plan.hours = v;
        }
        if let Some(v) = self.work {
            plan.work_minutes = v;
        }
        if let Some(v) = self.short_break {
            plan.short_break_minutes = v;
        }
        if let Some(v) = self.long_break {
            plan.long_break_minutes = v;
        }
        if let Some(v) = self.every {
            plan.work_units_per_long_break = v;
        }
    }
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub overrides: PlanOverrides,
    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct PlanRow {
    index: usize,
    kind: SessionKind,
    minutes: u32,
    starts_at_min: u64,
}

/// Settings from disk with command-line overrides, validated into a plan.
pub fn build_plan(
    overrides: &PlanOverrides,
) -> Result<(Settings, SessionPlan), Box<dyn std::error::Error>> {
    let mut settings = Settings::load_or_default();
    overrides.apply(&mut settings);
    let config = settings.configuration()?;
    let plan = generate(&config)?;
    Ok((settings, plan))
}

fn rows(plan: &SessionPlan) -> Vec<PlanRow> {
    let durations = plan.durations();
    let mut offset = 0u64;
    plan.kinds()
        .iter()
        .enumerate()
        .map(|(index, kind)| {
            let minutes = durations.minutes(*kind);
            let row = PlanRow {
                index,
                kind: *kind,
                minutes,
                starts_at_min: offset,
            };
            offset += u64::from(minutes);
            row
        })
        .collect()
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (_, plan) = build_plan(&args.overrides)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows(&plan))?);
        return Ok(());
    }

    for row in rows(&plan) {
        println!(
            "{:>3}  +{:>4} min  {:<12} {:>3} min",
            row.index + 1,
            row.starts_at_min,
            row.kind.label(),
            row.minutes
        );
    }
    println!(
        "{} work units, {} min of work, {} min total",
        plan.work_unit_count(),
        plan.total_work_minutes(),
        plan.total_duration_minutes()
    );
    Ok(())
}
