//! Calendar window generation.
//!
//! This module provides:
//! - View modes and their per-mode bucketing rules
//! - Day-by-day generation of the main/sub column hierarchy around today
//! - A service holding one generated window per view mode

mod column;
mod period;
mod service;
mod view_mode;
mod window;

pub use column::{MainColumn, SubColumn};
pub use period::PeriodUnit;
pub use service::{CalendarService, ViewModeConfig};
pub use view_mode::{half, quarter, week_of_month, ModeProfile, ViewMode};
pub use window::{compute_anchor, CalendarWindow, WindowSettings};
