//! Session plan generation.
//!
//! A plan is the ordered list of sessions a cycle walks through. It is built
//! once from a [`Configuration`] and never changes afterwards.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    pub fn is_break(self) -> bool {
        !matches!(self, SessionKind::Work)
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Work => "Work",
            SessionKind::ShortBreak => "Short Break",
            SessionKind::LongBreak => "Long Break",
        }
    }
}

/// Numeric inputs for plan generation. All fields must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub total_minutes_budget: u32,
    pub work_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub work_units_per_long_break: u32,
}

impl Configuration {
    /// Build a configuration whose minute budget comes from a number of hours.
    pub fn from_hours(
        hours: u32,
        work_minutes: u32,
        short_break_minutes: u32,
        long_break_minutes: u32,
        work_units_per_long_break: u32,
    ) -> Self {
        Self {
            total_minutes_budget: hours.saturating_mul(60),
            work_minutes,
            short_break_minutes,
            long_break_minutes,
            work_units_per_long_break,
        }
    }

    fn check_positive(&self) -> Result<(), PlanError> {
        let fields = [
            ("total_minutes_budget", self.total_minutes_budget),
            ("work_minutes", self.work_minutes),
            ("short_break_minutes", self.short_break_minutes),
            ("long_break_minutes", self.long_break_minutes),
            ("work_units_per_long_break", self.work_units_per_long_break),
        ];
        match fields.iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(PlanError::invalid(field, "must be greater than zero")),
            None => Ok(()),
        }
    }
}

/// Per-kind session lengths, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDurations {
    pub work_min: u32,
    pub short_break_min: u32,
    pub long_break_min: u32,
}

impl SessionDurations {
    pub fn minutes(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Work => self.work_min,
            SessionKind::ShortBreak => self.short_break_min,
            SessionKind::LongBreak => self.long_break_min,
        }
    }

    /// Saturates instead of overflowing on absurd minute counts.
    pub fn secs(&self, kind: SessionKind) -> u64 {
        u64::from(self.minutes(kind)).saturating_mul(60)
    }
}

/// Ordered sequence of sessions. Only [`generate`] builds one, so every plan
/// is non-empty, starts and ends with `Work`, and never holds two adjacent
/// breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlan {
    kinds: Vec<SessionKind>,
    durations: SessionDurations,
}

impl SessionPlan {
    pub fn kinds(&self) -> &[SessionKind] {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<SessionKind> {
        self.kinds.get(index).copied()
    }

    pub fn durations(&self) -> SessionDurations {
        self.durations
    }

    pub fn duration_secs(&self, kind: SessionKind) -> u64 {
        self.durations.secs(kind)
    }

    pub fn work_unit_count(&self) -> usize {
        self.kinds.iter().filter(|k| **k == SessionKind::Work).count()
    }

    /// Minutes of productive time contained in the first `units` work sessions.
    pub fn work_minutes_for(&self, units: u32) -> u64 {
        u64::from(units) * u64::from(self.durations.work_min)
    }

    pub fn total_work_minutes(&self) -> u64 {
        self.work_minutes_for(self.work_unit_count() as u32)
    }

    /// Work plus break minutes across the whole plan.
    pub fn total_duration_minutes(&self) -> u64 {
        self.kinds
            .iter()
            .map(|k| u64::from(self.durations.minutes(*k)))
            .sum()
    }
}

/// Upper bound on work units in one plan: a full day of one-minute units.
pub const MAX_WORK_UNITS: u32 = 1440;

/// Turn a configuration into a session plan.
///
/// The plan holds `ceil(total_minutes_budget / work_minutes)` work units with
/// one break between consecutive units. Every `work_units_per_long_break`-th
/// unit is followed by a long break; nothing follows the last unit. More than
/// [`MAX_WORK_UNITS`] units is rejected.
pub fn generate(config: &Configuration) -> Result<SessionPlan, PlanError> {
    config.check_positive()?;

    let work_unit_count = config
        .total_minutes_budget
        .div_ceil(config.work_minutes)
        .max(1);
    if work_unit_count > MAX_WORK_UNITS {
        return Err(PlanError::invalid(
            "total_minutes_budget",
            format!(
                "yields {work_unit_count} work units, more than the {MAX_WORK_UNITS} allowed"
            ),
        ));
    }

    let mut kinds = Vec::new();
    for i in 1..=work_unit_count {
        kinds.push(SessionKind::Work);
        if i < work_unit_count {
            kinds.push(if i % config.work_units_per_long_break == 0 {
                SessionKind::LongBreak
            } else {
                SessionKind::ShortBreak
            });
        }
    }

    Ok(SessionPlan {
        kinds,
        durations: SessionDurations {
            work_min: config.work_minutes,
            short_break_min: config.short_break_minutes,
            long_break_min: config.long_break_minutes,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionKind::{LongBreak, ShortBreak, Work};

    fn config(total: u32, work: u32, per_long: u32) -> Configuration {
        Configuration {
            total_minutes_budget: total,
            work_minutes: work,
            short_break_minutes: 5,
            long_break_minutes: 15,
            work_units_per_long_break: per_long,
        }
    }

    #[test]
    fn two_work_units_get_one_short_break() {
        let plan = generate(&config(50, 25, 4)).unwrap();
        assert_eq!(plan.kinds(), &[Work, ShortBreak, Work]);
    }

    #[test]
    fn long_break_every_second_unit() {
        let plan = generate(&config(125, 25, 2)).unwrap();
        assert_eq!(
            plan.kinds(),
            &[Work, ShortBreak, Work, LongBreak, Work, ShortBreak, Work, LongBreak, Work]
        );
    }

    #[test]
    fn budget_within_one_unit_is_single_work() {
        let plan = generate(&config(20, 25, 4)).unwrap();
        assert_eq!(plan.kinds(), &[Work]);
        let plan = generate(&config(25, 25, 4)).unwrap();
        assert_eq!(plan.kinds(), &[Work]);
    }

    #[test]
    fn partial_unit_rounds_up() {
        let plan = generate(&config(60, 25, 4)).unwrap();
        assert_eq!(plan.work_unit_count(), 3);
    }

    #[test]
    fn every_break_is_long_when_period_is_one() {
        let plan = generate(&config(100, 25, 1)).unwrap();
        assert!(plan
            .kinds()
            .iter()
            .filter(|k| k.is_break())
            .all(|k| *k == LongBreak));
    }

    #[test]
    fn zero_field_is_rejected() {
        let mut cfg = config(50, 25, 4);
        cfg.short_break_minutes = 0;
        let err = generate(&cfg).unwrap_err();
        assert_eq!(
            err,
            PlanError::invalid("short_break_minutes", "must be greater than zero")
        );
    }

    #[test]
    fn oversized_budget_is_rejected() {
        let err = generate(&config(u32::MAX, 1, 4)).unwrap_err();
        assert!(matches!(
            err,
            PlanError::InvalidConfiguration { ref field, .. } if field == "total_minutes_budget"
        ));
        let plan = generate(&config(MAX_WORK_UNITS, 1, 4)).unwrap();
        assert_eq!(plan.work_unit_count(), MAX_WORK_UNITS as usize);
    }

    #[test]
    fn from_hours_converts_budget() {
        let cfg = Configuration::from_hours(2, 25, 5, 15, 4);
        assert_eq!(cfg.total_minutes_budget, 120);
    }

    #[test]
    fn totals() {
        let plan = generate(&config(125, 25, 2)).unwrap();
        assert_eq!(plan.total_work_minutes(), 125);
        assert_eq!(plan.total_duration_minutes(), 125 + 5 * 2 + 15 * 2);
        assert_eq!(plan.duration_secs(ShortBreak), 300);
    }
}
