//! TOML-based application configuration.
//!
//! Stores layout preferences including:
//! - Calendar window size (main columns per page, buffer pages, week start)
//! - Pixel geometry (main column width, header height, row height)
//! - Item limits (count, span range, default size)
//! - The view mode shown at startup
//!
//! Configuration is stored at `~/.config/timegrid/config.toml`.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::calendar::{ViewMode, WindowSettings};
use crate::coordinator::TimelineSettings;
use crate::error::{ConfigError, Result};
use crate::grid::{ItemLimits, ItemSize};

/// Calendar window and header configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_main_cols_per_page")]
    pub main_cols_per_page: u32,
    #[serde(default)]
    pub pages_in_buffer: u32,
    /// Pixel width of one main column.
    #[serde(default = "default_main_col_width")]
    pub main_col_width: f64,
    /// Pixel height of the calendar header above the grid.
    #[serde(default = "default_calendar_height")]
    pub calendar_height: f64,
    #[serde(default = "default_week_start")]
    pub week_start: String,
}

/// Grid row configuration. Columns always follow the active view mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_rows")]
    pub rows: i32,
    #[serde(default = "default_row_height")]
    pub row_height: f64,
}

/// Item count and span limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsConfig {
    #[serde(default = "default_max_count")]
    pub max_count: usize,
    #[serde(default = "default_one")]
    pub min_rows: i32,
    #[serde(default = "default_one")]
    pub max_rows: i32,
    #[serde(default = "default_one")]
    pub min_cols: i32,
    #[serde(default = "default_max_cols")]
    pub max_cols: i32,
    #[serde(default = "default_item_size")]
    pub default_size: ItemSize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/timegrid/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_view_mode")]
    pub default_view_mode: ViewMode,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub items: ItemsConfig,
}

// Default functions
fn default_main_cols_per_page() -> u32 {
    5
}
fn default_main_col_width() -> f64 {
    200.0
}
fn default_calendar_height() -> f64 {
    100.0
}
fn default_week_start() -> String {
    "sunday".into()
}
fn default_rows() -> i32 {
    10
}
fn default_row_height() -> f64 {
    50.0
}
fn default_max_count() -> usize {
    10
}
fn default_one() -> i32 {
    1
}
fn default_max_cols() -> i32 {
    100
}
fn default_item_size() -> ItemSize {
    ItemSize::new(1, 4)
}
fn default_view_mode() -> ViewMode {
    ViewMode::Week
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            main_cols_per_page: default_main_cols_per_page(),
            pages_in_buffer: 0,
            main_col_width: default_main_col_width(),
            calendar_height: default_calendar_height(),
            week_start: default_week_start(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            row_height: default_row_height(),
        }
    }
}

impl Default for ItemsConfig {
    fn default() -> Self {
        Self {
            max_count: default_max_count(),
            min_rows: 1,
            max_rows: 1,
            min_cols: 1,
            max_cols: default_max_cols(),
            default_size: default_item_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_view_mode: default_view_mode(),
            calendar: CalendarConfig::default(),
            grid: GridConfig::default(),
            items: ItemsConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                tracing::debug!(path = %path.display(), "configuration loaded");
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. The result must still validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the updated configuration is invalid. `self` is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn week_start(&self) -> std::result::Result<Weekday, ConfigError> {
        self.calendar
            .week_start
            .parse::<Weekday>()
            .map_err(|_| ConfigError::UnknownWeekday(self.calendar.week_start.clone()))
    }

    /// Check every value the layout depends on.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        fn invalid(key: &str, message: &str) -> ConfigError {
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: message.to_string(),
            }
        }

        if self.calendar.main_cols_per_page == 0 {
            return Err(invalid("calendar.main_cols_per_page", "must be at least 1"));
        }
        if !(self.calendar.main_col_width > 0.0) {
            return Err(invalid("calendar.main_col_width", "must be positive"));
        }
        if !(self.calendar.calendar_height >= 0.0) {
            return Err(invalid("calendar.calendar_height", "must not be negative"));
        }
        self.week_start()?;
        if self.grid.rows < 1 {
            return Err(invalid("grid.rows", "must be at least 1"));
        }
        if !(self.grid.row_height > 0.0) {
            return Err(invalid("grid.row_height", "must be positive"));
        }

        let items = &self.items;
        if items.min_rows < 1 || items.min_rows > items.max_rows {
            return Err(invalid("items.min_rows", "must satisfy 1 <= min_rows <= max_rows"));
        }
        if items.min_cols < 1 || items.min_cols > items.max_cols {
            return Err(invalid("items.min_cols", "must satisfy 1 <= min_cols <= max_cols"));
        }
        if !self.item_limits().allows(&items.default_size) {
            return Err(invalid("items.default_size", "must lie within the span limits"));
        }
        Ok(())
    }

    pub fn item_limits(&self) -> ItemLimits {
        ItemLimits {
            max_count: self.items.max_count,
            min_rows: self.items.min_rows,
            max_rows: self.items.max_rows,
            min_cols: self.items.min_cols,
            max_cols: self.items.max_cols,
            default_size: self.items.default_size,
        }
    }

    /// Validated layout settings for the coordinator.
    pub fn timeline_settings(&self) -> std::result::Result<TimelineSettings, ConfigError> {
        self.validate()?;
        Ok(TimelineSettings {
            window: WindowSettings {
                main_cols_per_page: self.calendar.main_cols_per_page,
                pages_in_buffer: self.calendar.pages_in_buffer,
                week_start: self.week_start()?,
            },
            main_col_width: self.calendar.main_col_width,
            calendar_height: self.calendar.calendar_height,
            rows: self.grid.rows,
            row_height: self.grid.row_height,
            limits: self.item_limits(),
            initial_mode: self.default_view_mode,
        })
    }
}
