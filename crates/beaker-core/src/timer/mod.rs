mod cycle;
pub mod driver;
mod liquid;
mod plan;

pub use cycle::{
    CycleOptions, CycleSnapshot, CycleStatus, CycleSummary, SessionCycleController,
    SkipCuePolicy, TickOutcome,
};
pub use driver::{ControlCommand, DriveOutcome, TickDriver};
pub use liquid::{completion_fraction, format_clock, LiquidColor};
pub use plan::{
    generate, Configuration, SessionDurations, SessionKind, SessionPlan, MAX_WORK_UNITS,
};
