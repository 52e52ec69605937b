//! Core error types for timegrid-core.
//!
//! This module defines the error hierarchy using thiserror. Configuration
//! problems are fatal to the caller; placement rejections are recoverable and
//! always leave the grid exactly as it was before the attempt.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Core error type for timegrid-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A placement, move, resize or removal was refused
    #[error("Placement rejected: {0}")]
    Placement(#[from] PlacementError),

    /// Date arithmetic left the representable calendar range
    #[error("Date out of range near {0}")]
    DateOutOfRange(chrono::NaiveDate),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A string did not name one of the supported view modes
    #[error("Unknown view mode: '{0}' (expected week, month, quarter_year, half_year or year)")]
    UnknownViewMode(String),

    /// A string did not name a weekday
    #[error("Unknown weekday: '{0}'")]
    UnknownWeekday(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Reasons a grid mutation was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// Some covered cell lies outside `[0, rows) x [0, cols)`
    #[error("Cell ({row}, {col}) lies outside the grid")]
    OutOfBounds { row: i32, col: i32 },

    /// Some covered cell is already occupied by another item
    #[error("Cell ({row}, {col}) is already occupied")]
    Overlap { row: i32, col: i32 },

    /// Span outside the configured min/max item size
    #[error("Item size {rowspan}x{colspan} is outside the allowed range")]
    SpanOutOfRange { rowspan: i32, colspan: i32 },

    /// The grid already holds the maximum number of items
    #[error("Grid already holds the maximum of {max} items")]
    CapacityExceeded { max: usize },

    /// No item with this id is placed on the grid
    #[error("No item with id {0}")]
    UnknownItem(Uuid),
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

impl From<toml::ser::Error> for CoreError {
    fn from(err: toml::ser::Error) -> Self {
        CoreError::Custom(format!("TOML serialization failed: {err}"))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
