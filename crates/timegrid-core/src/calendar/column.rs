//! Main and sub column records of a generated calendar window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::view_mode::ViewMode;

/// Coarse time bucket on the axis header (a week, month, quarter, half or year).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainColumn {
    /// 0 is the period containing today; negative indices lie in the past.
    pub index: i32,
    /// Stable dedup key, e.g. `month_2_2025`.
    pub code: String,
    pub label: String,
    /// Numbers of the sub-columns inside this main column, ascending.
    pub sub_columns: Vec<i32>,
}

/// Fine time bucket; one grid column on the visible page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubColumn {
    /// Global, monotonic across the whole window. Grid column `c` of the
    /// first page is sub-column `c`.
    pub column_number: i32,
    pub main_index: i32,
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub view_mode: ViewMode,
    /// Contiguous, ascending, never empty.
    pub dates: Vec<NaiveDate>,
}

impl SubColumn {
    pub(crate) fn seed(column_number: i32, main_index: i32, mode: ViewMode, day: NaiveDate) -> Self {
        Self {
            column_number,
            main_index,
            label: mode.sub_label(day),
            start_date: day,
            end_date: day,
            view_mode: mode,
            dates: vec![day],
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn day_count(&self) -> usize {
        self.dates.len()
    }
}
