mod config;

pub use config::{CalendarConfig, Config, GridConfig, ItemsConfig};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns `~/.config/timegrid[-dev]/` based on TIMEGRID_ENV.
///
/// Set TIMEGRID_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TIMEGRID_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("timegrid-dev")
    } else {
        base_dir.join("timegrid")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
