//! # Timegrid Core Library
//!
//! This library provides the layout logic behind a multi-granularity timeline:
//! a calendar header of nested date columns over a grid of cells that holds
//! rectangular items. The `timegrid-cli` binary drives the same library from
//! the command line.
//!
//! ## Architecture
//!
//! - **Calendar**: Generates two-level (main/sub) column hierarchies around
//!   "today" for week, month, quarter-year, half-year and year views
//! - **Grid**: Cell occupancy, item placement validation and pixel snapping
//! - **Coordinator**: Keeps the grid's column layout in step with the active
//!   view mode and publishes every change as an event
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`CalendarService`]: Per-mode calendar windows
//! - [`GridEngine`]: Occupancy state and mutation validation
//! - [`TimelineCoordinator`]: View mode orchestration and event fan-out
//! - [`Config`]: Application configuration management

pub mod calendar;
pub mod clock;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod grid;
pub mod storage;

pub use calendar::{CalendarService, CalendarWindow, MainColumn, SubColumn, ViewMode, WindowSettings};
pub use clock::{Clock, FixedClock, SystemClock};
pub use coordinator::{Subscription, SubscriberId, TimelineCoordinator, TimelineSettings};
pub use error::{ConfigError, CoreError, PlacementError};
pub use events::TimelineEvent;
pub use grid::{GridCoord, GridDimensions, GridEngine, GridItem, ItemPosition, ItemSize, Rectangle};
pub use storage::Config;
