//! TOML-based settings.
//!
//! Stores the plan inputs, cue preferences and settle timings. Settings are
//! stored at `~/.config/beaker/config.toml`.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::data_dir;
use crate::effects::DEFAULT_VIBRATION_PATTERN;
use crate::error::{ConfigError, PlanError};
use crate::timer::{Configuration, CycleOptions, SkipCuePolicy};

/// Inputs to plan generation, as the user edits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSettings {
    #[serde(default = "default_hours")]
    pub hours: u32,
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_short_break")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break")]
    pub long_break_minutes: u32,
    #[serde(default = "default_units_per_long_break")]
    pub work_units_per_long_break: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueSettings {
    #[serde(default = "default_true")]
    pub sound: bool,
    #[serde(default = "default_true")]
    pub vibration: bool,
    #[serde(default = "default_vibration_pattern")]
    pub vibration_pattern_ms: Vec<u32>,
    /// Whether skipping a session plays its end cue.
    #[serde(default)]
    pub on_skip: SkipCuePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingSettings {
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
    #[serde(default = "default_skip_settle_secs")]
    pub skip_settle_secs: u64,
}

/// Application settings.
///
/// Serialized to/from TOML at `~/.config/beaker/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub plan: PlanSettings,
    #[serde(default)]
    pub cues: CueSettings,
    #[serde(default)]
    pub timing: TimingSettings,
}

fn default_hours() -> u32 {
    2
}
fn default_work_minutes() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_units_per_long_break() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_vibration_pattern() -> Vec<u32> {
    DEFAULT_VIBRATION_PATTERN.to_vec()
}
fn default_settle_secs() -> u64 {
    3
}
fn default_skip_settle_secs() -> u64 {
    1
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            hours: default_hours(),
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break(),
            long_break_minutes: default_long_break(),
            work_units_per_long_break: default_units_per_long_break(),
        }
    }
}

impl Default for CueSettings {
    fn default() -> Self {
        Self {
            sound: true,
            vibration: true,
            vibration_pattern_ms: default_vibration_pattern(),
            on_skip: SkipCuePolicy::Silent,
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            settle_secs: default_settle_secs(),
            skip_settle_secs: default_skip_settle_secs(),
        }
    }
}

/// Accepted ranges for user-facing plan inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangePolicy {
    pub hours: RangeInclusive<u32>,
    pub work_minutes: RangeInclusive<u32>,
    pub short_break_minutes: RangeInclusive<u32>,
    pub long_break_minutes: RangeInclusive<u32>,
    pub work_units_per_long_break: RangeInclusive<u32>,
}

impl Default for RangePolicy {
    fn default() -> Self {
        Self {
            hours: 1..=12,
            work_minutes: 1..=120,
            short_break_minutes: 1..=60,
            long_break_minutes: 1..=120,
            work_units_per_long_break: 1..=12,
        }
    }
}

impl RangePolicy {
    /// Check every field and build the plan configuration.
    pub fn validate(&self, plan: &PlanSettings) -> Result<Configuration, PlanError> {
        let checks = [
            ("hours", plan.hours, &self.hours),
            ("work_minutes", plan.work_minutes, &self.work_minutes),
            (
                "short_break_minutes",
                plan.short_break_minutes,
                &self.short_break_minutes,
            ),
            (
                "long_break_minutes",
                plan.long_break_minutes,
                &self.long_break_minutes,
            ),
            (
                "work_units_per_long_break",
                plan.work_units_per_long_break,
                &self.work_units_per_long_break,
            ),
        ];
        for (field, value, range) in checks {
            if !range.contains(&value) {
                return Err(PlanError::invalid(
                    field,
                    format!(
                        "{value} is outside {}..={}",
                        range.start(),
                        range.end()
                    ),
                ));
            }
        }
        Ok(Configuration::from_hours(
            plan.hours,
            plan.work_minutes,
            plan.short_break_minutes,
            plan.long_break_minutes,
            plan.work_units_per_long_break,
        ))
    }
}

impl Settings {
    /// Default settings file location.
    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("~/.config/beaker"),
                message: e.to_string(),
            })
    }

    /// Load from the default location, writing defaults if the file is missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                settings.save_to(path)?;
                Ok(settings)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Load from disk, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Look up a value by dotted key, e.g. `plan.work_minutes`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let value = key.split('.').try_fold(&json, |node, part| node.get(part))?;
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Update a value by dotted key. The raw string is parsed according to
    /// the current value's type. Plan keys are range-checked.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        let slot = key
            .split('.')
            .try_fold(&mut json, |node, part| node.get_mut(part))
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        *slot = parse_like(slot, raw).map_err(invalid)?;

        let updated: Settings = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        if key.starts_with("plan.") {
            RangePolicy::default()
                .validate(&updated.plan)
                .map_err(|e| invalid(e.to_string()))?;
        }
        *self = updated;
        Ok(())
    }

    /// Validated plan configuration.
    pub fn configuration(&self) -> Result<Configuration, PlanError> {
        RangePolicy::default().validate(&self.plan)
    }

    pub fn cycle_options(&self) -> CycleOptions {
        CycleOptions {
            settle_secs: self.timing.settle_secs,
            skip_settle_secs: self.timing.skip_settle_secs,
            skip_cue: self.cues.on_skip,
            cues_enabled: self.cues.sound,
            vibration_enabled: self.cues.vibration,
            vibration_pattern_ms: self.cues.vibration_pattern_ms.clone(),
        }
    }
}

fn parse_like(existing: &Value, raw: &str) -> Result<Value, String> {
    match existing {
        Value::Bool(_) => raw
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| format!("expected true or false, got '{raw}'")),
        Value::Number(_) => raw
            .parse::<u64>()
            .map(Value::from)
            .map_err(|_| format!("expected a non-negative integer, got '{raw}'")),
        Value::Array(_) => serde_json::from_str(raw).map_err(|e| e.to_string()),
        Value::String(_) => Ok(Value::String(raw.to_string())),
        Value::Object(_) | Value::Null => Err("not a settable key".into()),
    }
}
