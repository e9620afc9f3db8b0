mod config;

pub use config::{CueSettings, PlanSettings, RangePolicy, Settings, TimingSettings};

use std::path::PathBuf;

/// Returns `~/.config/beaker[-dev]/` based on BEAKER_ENV.
///
/// Set BEAKER_ENV=dev to use a development settings directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    let dir = match std::env::var("BEAKER_ENV").as_deref() {
        Ok("dev") => base_dir.join("beaker-dev"),
        _ => base_dir.join("beaker"),
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
