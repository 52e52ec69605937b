pub mod calendar;
pub mod config;
pub mod grid;
pub mod replay;

use chrono::NaiveDate;
use timegrid_core::{Clock, Config, CoreError, SystemClock, TimelineSettings};

/// Settings from the stored config, with the page size optionally overridden.
pub(crate) fn load_settings(
    per_page: Option<u32>,
    pages: Option<u32>,
) -> Result<TimelineSettings, CoreError> {
    let mut config = Config::load()?;
    if let Some(per_page) = per_page {
        config.calendar.main_cols_per_page = per_page;
    }
    if let Some(pages) = pages {
        config.calendar.pages_in_buffer = pages;
    }
    Ok(config.timeline_settings()?)
}

pub(crate) fn today_or_now(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| SystemClock.today())
}
