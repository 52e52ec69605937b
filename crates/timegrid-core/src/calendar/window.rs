//! Windowed column hierarchy generation.
//!
//! A window covers whole main-column periods around today: the page holding
//! today plus `pages_in_buffer` pages in each direction. Days are walked one
//! at a time and a new sub-column opens exactly where the mode's sub selector
//! changes value, so sub-columns may hold a different number of days (the
//! fourth week of a month runs to its last day).
//!
//! ## Numbering
//!
//! ```text
//!   past  ... -2  -1 | 0  1  2 ...  future
//!                    ^ anchor (first day of today's period)
//! ```
//!
//! The forward pass starts on the anchor and numbers sub-columns from 0.
//! The backward pass starts the day before the anchor and numbers from -1
//! downwards. Both derive the main index as `floor(number / per_main)`, which
//! is the same bucketing the grid uses for column banding.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::column::{MainColumn, SubColumn};
use super::view_mode::{quarter, ViewMode};
use crate::error::{CoreError, Result};

/// Size of the generated window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSettings {
    pub main_cols_per_page: u32,
    pub pages_in_buffer: u32,
    pub week_start: Weekday,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            main_cols_per_page: 5,
            pages_in_buffer: 0,
            week_start: Weekday::Sun,
        }
    }
}

impl WindowSettings {
    /// Future width in `period_advance` units. Includes the page holding today.
    pub fn future_units(&self, mode: ViewMode) -> i64 {
        let profile = mode.profile();
        i64::from(self.main_cols_per_page)
            * i64::from(profile.unit_multiplier)
            * (1 + i64::from(self.pages_in_buffer))
    }

    /// Past width in `period_advance` units.
    pub fn past_units(&self, mode: ViewMode) -> i64 {
        let profile = mode.profile();
        i64::from(self.main_cols_per_page)
            * i64::from(profile.unit_multiplier)
            * i64::from(self.pages_in_buffer)
    }
}

/// Generated column hierarchy for one view mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarWindow {
    mode: ViewMode,
    anchor: NaiveDate,
    main_columns: BTreeMap<i32, MainColumn>,
    sub_columns: BTreeMap<i32, SubColumn>,
}

/// First day of the period containing `today`.
///
/// Half-years start at quarter 1 or quarter 3: a date in quarter 2 or 4 is
/// moved back to the preceding odd quarter before taking the period start.
pub fn compute_anchor(mode: ViewMode, today: NaiveDate, week_start: Weekday) -> Result<NaiveDate> {
    let profile = mode.profile();
    let date = match mode {
        ViewMode::HalfYear => {
            let q = quarter(today);
            let q = if q % 2 == 0 { q - 1 } else { q };
            let month = (q as u32 - 1) * 3 + 1;
            NaiveDate::from_ymd_opt(today.year(), month, 1)
                .ok_or(CoreError::DateOutOfRange(today))?
        }
        _ => today,
    };
    profile
        .period_start
        .start_of(date, week_start)
        .ok_or(CoreError::DateOutOfRange(today))
}

impl CalendarWindow {
    fn empty(mode: ViewMode, anchor: NaiveDate) -> Self {
        Self {
            mode,
            anchor,
            main_columns: BTreeMap::new(),
            sub_columns: BTreeMap::new(),
        }
    }

    /// Generate the window for `mode` around `today`.
    pub fn generate(mode: ViewMode, today: NaiveDate, settings: &WindowSettings) -> Result<Self> {
        debug_assert!(settings.main_cols_per_page >= 1, "main_cols_per_page must be >= 1");
        let profile = mode.profile();
        let anchor = compute_anchor(mode, today, settings.week_start)?;

        let future_end = profile
            .period_advance
            .shift(anchor, settings.future_units(mode))
            .and_then(|d| d.pred_opt())
            .ok_or(CoreError::DateOutOfRange(anchor))?;
        let past_end = profile
            .period_advance
            .shift(anchor, -settings.past_units(mode))
            .ok_or(CoreError::DateOutOfRange(anchor))?;

        let mut window = Self::empty(mode, anchor);
        window.build_forward(future_end)?;
        window.build_backward(past_end)?;
        window.finalize_bounds();

        tracing::debug!(
            mode = %mode,
            %anchor,
            main_columns = window.main_columns.len(),
            sub_columns = window.sub_columns.len(),
            "calendar window generated"
        );
        Ok(window)
    }

    /// Walk from the anchor to `end` inclusive, numbering 0, 1, 2, ...
    pub(crate) fn build_forward(&mut self, end: NaiveDate) -> Result<()> {
        let sub_selector = self.mode.profile().sub_selector;
        let mut counter: i32 = -1;
        let mut current: Option<i32> = None;
        let mut day = self.anchor;

        while day <= end {
            let unit = sub_selector(day);
            if current != Some(unit) {
                counter += 1;
                current = Some(unit);
                self.open_sub_column(counter, day);
            } else {
                self.push_date(counter, day);
            }
            day = day.succ_opt().ok_or(CoreError::DateOutOfRange(day))?;
        }
        Ok(())
    }

    /// Walk from the day before the anchor back to `end` inclusive,
    /// numbering -1, -2, ...
    pub(crate) fn build_backward(&mut self, end: NaiveDate) -> Result<()> {
        let sub_selector = self.mode.profile().sub_selector;
        let mut counter: i32 = 0;
        let mut current: Option<i32> = None;
        let Some(mut day) = self.anchor.pred_opt() else {
            return Ok(());
        };

        while day >= end {
            let unit = sub_selector(day);
            if current != Some(unit) {
                counter -= 1;
                current = Some(unit);
                self.open_sub_column(counter, day);
            } else {
                self.push_date(counter, day);
            }
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }
        Ok(())
    }

    fn open_sub_column(&mut self, number: i32, day: NaiveDate) {
        let per_main = self.mode.sub_columns_per_main() as i32;
        let main_index = number.div_euclid(per_main);
        let mode = self.mode;

        let main = self
            .main_columns
            .entry(main_index)
            .or_insert_with(|| MainColumn {
                index: main_index,
                code: mode.main_code(day),
                label: mode.main_label(day),
                sub_columns: Vec::new(),
            });
        main.sub_columns.push(number);

        let previous = self
            .sub_columns
            .insert(number, SubColumn::seed(number, main_index, mode, day));
        debug_assert!(previous.is_none(), "sub-column {number} numbered twice");
    }

    fn push_date(&mut self, number: i32, day: NaiveDate) {
        if let Some(sub) = self.sub_columns.get_mut(&number) {
            sub.dates.push(day);
        }
    }

    /// Sort every sub-column's dates and derive bounds and labels from them.
    ///
    /// The backward pass inserts dates newest first, so labels and codes are
    /// recomputed here from the earliest date of each column.
    pub(crate) fn finalize_bounds(&mut self) {
        let mode = self.mode;
        for sub in self.sub_columns.values_mut() {
            sub.dates.sort_unstable();
            sub.dates.dedup();
            if let (Some(first), Some(last)) = (sub.dates.first(), sub.dates.last()) {
                sub.start_date = *first;
                sub.end_date = *last;
                sub.label = mode.sub_label(*first);
            }
        }
        for main in self.main_columns.values_mut() {
            main.sub_columns.sort_unstable();
            let first_date = main
                .sub_columns
                .first()
                .and_then(|n| self.sub_columns.get(n))
                .map(|sub| sub.start_date);
            if let Some(date) = first_date {
                main.code = mode.main_code(date);
                main.label = mode.main_label(date);
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Main columns in chronological order.
    pub fn main_columns(&self) -> impl Iterator<Item = &MainColumn> {
        self.main_columns.values()
    }

    /// Sub-columns in chronological order.
    pub fn sub_columns(&self) -> impl Iterator<Item = &SubColumn> {
        self.sub_columns.values()
    }

    pub fn main_column(&self, index: i32) -> Option<&MainColumn> {
        self.main_columns.get(&index)
    }

    pub fn sub_column(&self, number: i32) -> Option<&SubColumn> {
        self.sub_columns.get(&number)
    }

    /// Sub-columns belonging to `main`, in order.
    pub fn subs_of<'a>(&'a self, main: &'a MainColumn) -> impl Iterator<Item = &'a SubColumn> + 'a {
        main.sub_columns
            .iter()
            .filter_map(move |n| self.sub_columns.get(n))
    }

    /// Main column that owns sub-column `number`.
    pub fn main_column_for(&self, number: i32) -> Option<&MainColumn> {
        let sub = self.sub_columns.get(&number)?;
        self.main_columns.get(&sub.main_index)
    }

    /// Dates represented by grid column `col` of the first page.
    pub fn dates_for_column(&self, col: i32) -> Option<&[NaiveDate]> {
        self.sub_columns.get(&col).map(|sub| sub.dates.as_slice())
    }

    /// Sub-column containing `date`, if the window covers it.
    pub fn sub_column_at(&self, date: NaiveDate) -> Option<&SubColumn> {
        self.sub_columns.values().find(|sub| sub.contains(date))
    }

    pub fn main_column_count(&self) -> usize {
        self.main_columns.len()
    }

    pub fn sub_column_count(&self) -> usize {
        self.sub_columns.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.sub_columns.values().next().map(|sub| sub.start_date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.sub_columns.values().next_back().map(|sub| sub.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn settings(per_page: u32, pages: u32) -> WindowSettings {
        WindowSettings {
            main_cols_per_page: per_page,
            pages_in_buffer: pages,
            week_start: Weekday::Sun,
        }
    }

    #[test]
    fn week_window_without_buffer() {
        let window =
            CalendarWindow::generate(ViewMode::Week, ymd(2025, 3, 15), &settings(5, 0)).unwrap();

        assert_eq!(window.anchor(), ymd(2025, 3, 9));
        assert_eq!(window.main_column_count(), 5);
        for main in window.main_columns() {
            assert_eq!(main.sub_columns.len(), 7, "main column {}", main.index);
        }
        let first = window.sub_column(0).unwrap();
        assert_eq!(first.start_date, ymd(2025, 3, 9));
        assert_eq!(first.main_index, 0);
        assert_eq!(window.last_date(), Some(ymd(2025, 4, 12)));
        assert!(window.sub_column(-1).is_none());
    }

    #[test]
    fn half_year_anchor_normalizes_quarter_two_and_four() {
        assert_eq!(
            compute_anchor(ViewMode::HalfYear, ymd(2025, 5, 20), Weekday::Sun).unwrap(),
            ymd(2025, 1, 1)
        );
        assert_eq!(
            compute_anchor(ViewMode::HalfYear, ymd(2025, 11, 2), Weekday::Sun).unwrap(),
            ymd(2025, 7, 1)
        );
        assert_eq!(
            compute_anchor(ViewMode::HalfYear, ymd(2025, 8, 2), Weekday::Sun).unwrap(),
            ymd(2025, 7, 1)
        );
    }

    #[test]
    fn month_window_has_four_weeks_per_month() {
        let window =
            CalendarWindow::generate(ViewMode::Month, ymd(2025, 2, 10), &settings(3, 0)).unwrap();

        assert_eq!(window.sub_column_count(), 12);
        let labels: Vec<&str> = window.main_columns().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Feb 2025", "Mar 2025", "Apr 2025"]);

        // February 2025: week 4 is the 22nd..28th
        let week4 = window.sub_column(3).unwrap();
        assert_eq!(week4.start_date, ymd(2025, 2, 22));
        assert_eq!(week4.end_date, ymd(2025, 2, 28));
        // March: week 4 absorbs the 29th..31st
        let march_week4 = window.sub_column(7).unwrap();
        assert_eq!(march_week4.day_count(), 10);
        assert_eq!(march_week4.main_index, 1);
    }

    #[test]
    fn backward_pass_uses_negative_numbers() {
        let window =
            CalendarWindow::generate(ViewMode::QuarterYear, ymd(2025, 5, 1), &settings(2, 1)).unwrap();

        assert_eq!(window.anchor(), ymd(2025, 4, 1));
        // 2 quarters back, 4 quarters forward
        assert_eq!(window.main_column_count(), 6);
        assert_eq!(window.sub_column_count(), 18);

        let prev = window.sub_column(-1).unwrap();
        assert_eq!(prev.start_date, ymd(2025, 3, 1));
        assert_eq!(prev.end_date, ymd(2025, 3, 31));
        assert_eq!(prev.main_index, -1);
        assert_eq!(prev.label, "Mar");

        let oldest = window.main_column(-2).unwrap();
        assert_eq!(oldest.label, "Quarter 4 2024");
        assert_eq!(oldest.sub_columns, vec![-6, -5, -4]);
        assert_eq!(window.first_date(), Some(ymd(2024, 10, 1)));
    }

    #[test]
    fn anchor_day_belongs_only_to_column_zero() {
        let window =
            CalendarWindow::generate(ViewMode::Week, ymd(2025, 3, 15), &settings(1, 1)).unwrap();
        let anchor = window.anchor();
        let holders: Vec<i32> = window
            .sub_columns()
            .filter(|s| s.dates.contains(&anchor))
            .map(|s| s.column_number)
            .collect();
        assert_eq!(holders, vec![0]);
    }

    #[test]
    fn dates_for_column_maps_grid_columns() {
        let window =
            CalendarWindow::generate(ViewMode::Year, ymd(2024, 6, 1), &settings(1, 0)).unwrap();
        let feb = window.dates_for_column(1).unwrap();
        assert_eq!(feb.len(), 29);
        assert_eq!(feb[0], ymd(2024, 2, 1));
        assert!(window.dates_for_column(12).is_none());
        assert_eq!(window.main_column_for(11).unwrap().label, "2024");
    }

    #[test]
    fn sub_column_at_finds_containing_column() {
        let window =
            CalendarWindow::generate(ViewMode::Month, ymd(2025, 3, 15), &settings(1, 0)).unwrap();
        let sub = window.sub_column_at(ymd(2025, 3, 30)).unwrap();
        assert_eq!(sub.column_number, 3);
        assert!(window.sub_column_at(ymd(2025, 4, 1)).is_none());
    }
}
