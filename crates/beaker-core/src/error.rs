//! Core error types for beaker-core.
//!
//! Plan and cycle errors are usage errors surfaced synchronously to the
//! caller. Collaborator failures (`EffectError`) are logged and swallowed by
//! the controller and never reach this hierarchy.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::CycleStatus;

/// Core error type for beaker-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Plan generation errors
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Cycle state machine errors
    #[error("Cycle error: {0}")]
    Cycle(#[from] CycleError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors outside the settings file
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors raised before a plan is built. No partial state exists when one
/// of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Invalid configuration for '{field}': {message}")]
    InvalidConfiguration { field: String, message: String },
}

impl PlanError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        PlanError::InvalidConfiguration {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// An operation was invoked in a state that forbids it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// `start` called while a cycle is already loaded.
    #[error("Cycle already started (status: {status})")]
    AlreadyStarted { status: CycleStatus },

    #[error("Cannot {operation} while {status}")]
    InvalidTransition {
        operation: &'static str,
        status: CycleStatus,
    },
}

/// Failure reported by an external collaborator (audio, haptics, wake lock).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    #[error("{effect} failed: {message}")]
    Failed {
        effect: &'static str,
        message: String,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_table(text: &str) -> Result<toml::Table> {
        Ok(toml::from_str(text)?)
    }

    #[test]
    fn toml_errors_convert_into_core_error() {
        let err = parse_table("plan = [").unwrap_err();
        assert!(matches!(err, CoreError::Toml(_)));
        assert!(err.to_string().starts_with("TOML error:"));
        assert!(parse_table("[plan]\nhours = 2").is_ok());
    }

    #[test]
    fn cycle_errors_name_the_operation() {
        let err = CoreError::from(CycleError::InvalidTransition {
            operation: "tick",
            status: CycleStatus::Idle,
        });
        assert_eq!(err.to_string(), "Cycle error: Cannot tick while idle");
    }
}
