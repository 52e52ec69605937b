//! Holds one generated window per view mode.

use chrono::NaiveDate;

use super::view_mode::{ModeProfile, ViewMode};
use super::window::{CalendarWindow, WindowSettings};
use crate::clock::Clock;
use crate::error::Result;

/// Rules and generated window for one view mode.
///
/// The rules never change after construction; only the window is replaced
/// when the calendar is regenerated.
#[derive(Debug, Clone)]
pub struct ViewModeConfig {
    mode: ViewMode,
    profile: ModeProfile,
    calendar: CalendarWindow,
}

impl ViewModeConfig {
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn profile(&self) -> &ModeProfile {
        &self.profile
    }

    pub fn sub_columns_per_main(&self) -> u32 {
        self.profile.sub_columns_per_main
    }

    pub fn unit_multiplier(&self) -> u32 {
        self.profile.unit_multiplier
    }

    pub fn calendar(&self) -> &CalendarWindow {
        &self.calendar
    }
}

/// Calendar windows for every view mode, generated around one "today".
#[derive(Debug, Clone)]
pub struct CalendarService {
    settings: WindowSettings,
    today: NaiveDate,
    /// Indexed by [`ViewMode::ordinal`].
    configs: Vec<ViewModeConfig>,
}

impl CalendarService {
    /// Generate windows for all five modes.
    pub fn new(settings: WindowSettings, today: NaiveDate) -> Result<Self> {
        let configs = Self::generate_all(&settings, today)?;
        Ok(Self {
            settings,
            today,
            configs,
        })
    }

    pub fn from_clock(settings: WindowSettings, clock: &dyn Clock) -> Result<Self> {
        Self::new(settings, clock.today())
    }

    fn generate_all(settings: &WindowSettings, today: NaiveDate) -> Result<Vec<ViewModeConfig>> {
        ViewMode::ALL
            .iter()
            .map(|&mode| {
                Ok(ViewModeConfig {
                    mode,
                    profile: mode.profile(),
                    calendar: CalendarWindow::generate(mode, today, settings)?,
                })
            })
            .collect()
    }

    /// Rebuild every window around `today`. On error the previous windows are kept.
    pub fn regenerate(&mut self, today: NaiveDate) -> Result<()> {
        let configs = Self::generate_all(&self.settings, today)?;
        self.configs = configs;
        self.today = today;
        tracing::info!(%today, "calendar windows regenerated");
        Ok(())
    }

    /// Regenerate only if the clock has moved to another date.
    /// Returns `true` when the windows were rebuilt.
    pub fn refresh(&mut self, clock: &dyn Clock) -> Result<bool> {
        let today = clock.today();
        if today == self.today {
            return Ok(false);
        }
        self.regenerate(today)?;
        Ok(true)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn settings(&self) -> &WindowSettings {
        &self.settings
    }

    pub fn main_cols_per_page(&self) -> u32 {
        self.settings.main_cols_per_page
    }

    pub fn config(&self, mode: ViewMode) -> &ViewModeConfig {
        &self.configs[mode.ordinal()]
    }

    pub fn window(&self, mode: ViewMode) -> &CalendarWindow {
        &self.config(mode).calendar
    }

    pub fn configs(&self) -> impl Iterator<Item = &ViewModeConfig> {
        self.configs.iter()
    }
}
