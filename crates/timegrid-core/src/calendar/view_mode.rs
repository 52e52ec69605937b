//! View modes and their per-mode calendar rules.
//!
//! Each mode is a closed enum variant mapped to a [`ModeProfile`] of plain
//! function pointers. Labels and codes are exhaustive matches, so adding a
//! mode is a compile error until every rule handles it.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::period::PeriodUnit;
use crate::error::ConfigError;

/// Time granularity of the timeline axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Week,
    Month,
    QuarterYear,
    HalfYear,
    Year,
}

/// Static calendar rules for one view mode.
#[derive(Debug, Clone, Copy)]
pub struct ModeProfile {
    /// Number of sub-columns inside one main column.
    pub sub_columns_per_main: u32,
    /// Coarse bucket a date belongs to (week of month, month, quarter, half,
    /// year). Forms the bucket part of [`ViewMode::main_code`].
    pub main_selector: fn(NaiveDate) -> i32,
    /// Fine bucket a date belongs to. A sub-column ends where this changes.
    pub sub_selector: fn(NaiveDate) -> i32,
    /// Unit used to find the start of today's period.
    pub period_start: PeriodUnit,
    /// Unit used to step one main column forward or back.
    pub period_advance: PeriodUnit,
    /// `period_advance` steps per main column.
    pub unit_multiplier: u32,
}

impl ViewMode {
    pub const ALL: [ViewMode; 5] = [
        ViewMode::Week,
        ViewMode::Month,
        ViewMode::QuarterYear,
        ViewMode::HalfYear,
        ViewMode::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::QuarterYear => "quarter_year",
            Self::HalfYear => "half_year",
            Self::Year => "year",
        }
    }

    /// Position of this mode in [`ViewMode::ALL`].
    pub fn ordinal(&self) -> usize {
        match self {
            Self::Week => 0,
            Self::Month => 1,
            Self::QuarterYear => 2,
            Self::HalfYear => 3,
            Self::Year => 4,
        }
    }

    pub fn profile(&self) -> ModeProfile {
        match self {
            Self::Week => ModeProfile {
                sub_columns_per_main: 7,
                main_selector: week_of_month,
                sub_selector: day_of_month,
                period_start: PeriodUnit::Week,
                period_advance: PeriodUnit::Week,
                unit_multiplier: 1,
            },
            Self::Month => ModeProfile {
                sub_columns_per_main: 4,
                main_selector: month_index,
                sub_selector: week_of_month,
                period_start: PeriodUnit::Month,
                period_advance: PeriodUnit::Month,
                unit_multiplier: 1,
            },
            Self::QuarterYear => ModeProfile {
                sub_columns_per_main: 3,
                main_selector: quarter,
                sub_selector: month_index,
                period_start: PeriodUnit::Quarter,
                period_advance: PeriodUnit::Quarter,
                unit_multiplier: 1,
            },
            Self::HalfYear => ModeProfile {
                sub_columns_per_main: 6,
                main_selector: half,
                sub_selector: month_index,
                period_start: PeriodUnit::Quarter,
                period_advance: PeriodUnit::Quarter,
                unit_multiplier: 2,
            },
            Self::Year => ModeProfile {
                sub_columns_per_main: 12,
                main_selector: year,
                sub_selector: month_index,
                period_start: PeriodUnit::Year,
                period_advance: PeriodUnit::Year,
                unit_multiplier: 1,
            },
        }
    }

    pub fn sub_columns_per_main(&self) -> u32 {
        self.profile().sub_columns_per_main
    }

    /// Header label of the main column starting at `date`, e.g. "Mar 2025".
    pub fn main_label(&self, date: NaiveDate) -> String {
        match self {
            Self::Week | Self::Month => date.format("%b %Y").to_string(),
            Self::QuarterYear => format!("Quarter {} {}", quarter(date), date.year()),
            Self::HalfYear => format!("Half {} {}", half(date), date.year()),
            Self::Year => date.year().to_string(),
        }
    }

    /// Stable dedup key of the main column containing `date`.
    pub fn main_code(&self, date: NaiveDate) -> String {
        let mode = self.as_str();
        let bucket = (self.profile().main_selector)(date);
        match self {
            Self::Week => format!("{mode}_{bucket}_{}_{}", date.month0(), date.year()),
            Self::Month | Self::QuarterYear | Self::HalfYear | Self::Year => {
                format!("{mode}_{bucket}_{}", date.year())
            }
        }
    }

    /// Label of the sub-column starting at `date`.
    pub fn sub_label(&self, date: NaiveDate) -> String {
        match self {
            Self::Week | Self::Month => date.day().to_string(),
            Self::QuarterYear | Self::HalfYear => date.format("%b").to_string(),
            Self::Year => date.format("%b").to_string().chars().take(1).collect(),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter_year" | "quarter" => Ok(Self::QuarterYear),
            "half_year" | "half" => Ok(Self::HalfYear),
            "year" => Ok(Self::Year),
            _ => Err(ConfigError::UnknownViewMode(s.to_string())),
        }
    }
}

/// Week of the month, `ceil(day / 7)` capped at 4.
///
/// Days 29-31 fold into week 4, so every month has exactly four weeks and
/// the last one may be up to ten days long.
pub fn week_of_month(date: NaiveDate) -> i32 {
    let day = date.day() as i32;
    ((day + 6) / 7).min(4)
}

/// Quarter of the year, 1-4.
pub fn quarter(date: NaiveDate) -> i32 {
    date.month0() as i32 / 3 + 1
}

/// Half of the year, 1 or 2.
pub fn half(date: NaiveDate) -> i32 {
    if quarter(date) < 3 {
        1
    } else {
        2
    }
}

fn day_of_month(date: NaiveDate) -> i32 {
    date.day() as i32
}

fn month_index(date: NaiveDate) -> i32 {
    date.month0() as i32
}

fn year(date: NaiveDate) -> i32 {
    date.year()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_of_month_caps_at_four() {
        assert_eq!(week_of_month(ymd(2025, 3, 1)), 1);
        assert_eq!(week_of_month(ymd(2025, 3, 7)), 1);
        assert_eq!(week_of_month(ymd(2025, 3, 8)), 2);
        assert_eq!(week_of_month(ymd(2025, 3, 21)), 3);
        assert_eq!(week_of_month(ymd(2025, 3, 22)), 4);
        assert_eq!(week_of_month(ymd(2025, 3, 28)), 4);
        // 5th partial week folds into week 4
        assert_eq!(week_of_month(ymd(2025, 3, 29)), 4);
        assert_eq!(week_of_month(ymd(2025, 3, 31)), 4);
    }

    #[test]
    fn sub_columns_per_main_per_mode() {
        let counts: Vec<u32> = ViewMode::ALL
            .iter()
            .map(|m| m.sub_columns_per_main())
            .collect();
        assert_eq!(counts, vec![7, 4, 3, 6, 12]);
    }

    #[test]
    fn only_half_year_uses_multiplier() {
        for mode in ViewMode::ALL {
            let expected = if mode == ViewMode::HalfYear { 2 } else { 1 };
            assert_eq!(mode.profile().unit_multiplier, expected, "{mode}");
        }
    }

    #[test]
    fn main_labels() {
        let date = ymd(2025, 3, 9);
        assert_eq!(ViewMode::Week.main_label(date), "Mar 2025");
        assert_eq!(ViewMode::Month.main_label(date), "Mar 2025");
        assert_eq!(ViewMode::QuarterYear.main_label(date), "Quarter 1 2025");
        assert_eq!(ViewMode::HalfYear.main_label(ymd(2025, 7, 1)), "Half 2 2025");
        assert_eq!(ViewMode::Year.main_label(date), "2025");
    }

    #[test]
    fn main_codes() {
        let date = ymd(2025, 3, 9);
        assert_eq!(ViewMode::Week.main_code(date), "week_2_2_2025");
        assert_eq!(ViewMode::Month.main_code(date), "month_2_2025");
        assert_eq!(ViewMode::QuarterYear.main_code(date), "quarter_year_1_2025");
        assert_eq!(ViewMode::HalfYear.main_code(date), "half_year_1_2025");
        assert_eq!(ViewMode::Year.main_code(date), "year_2025_2025");

        let late = ymd(2025, 11, 3);
        assert_eq!(ViewMode::QuarterYear.main_code(late), "quarter_year_4_2025");
        assert_eq!(ViewMode::HalfYear.main_code(late), "half_year_2_2025");
    }

    #[test]
    fn main_code_follows_main_selector() {
        let date = ymd(2024, 8, 30);
        for mode in ViewMode::ALL {
            let bucket = (mode.profile().main_selector)(date);
            let code = mode.main_code(date);
            let prefix = format!("{}_{bucket}_", mode.as_str());
            assert!(code.starts_with(&prefix), "{code} vs {prefix}");
        }
    }

    #[test]
    fn sub_labels() {
        let date = ymd(2025, 3, 9);
        assert_eq!(ViewMode::Week.sub_label(date), "9");
        assert_eq!(ViewMode::Month.sub_label(date), "9");
        assert_eq!(ViewMode::QuarterYear.sub_label(date), "Mar");
        assert_eq!(ViewMode::HalfYear.sub_label(date), "Mar");
        assert_eq!(ViewMode::Year.sub_label(date), "M");
    }

    #[test]
    fn parse_round_trips_and_rejects_unknown() {
        for mode in ViewMode::ALL {
            assert_eq!(mode.as_str().parse::<ViewMode>().unwrap(), mode);
        }
        assert_eq!("Half-Year".parse::<ViewMode>().unwrap(), ViewMode::HalfYear);
        assert!(matches!(
            "decade".parse::<ViewMode>(),
            Err(ConfigError::UnknownViewMode(_))
        ));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ViewMode::QuarterYear).unwrap();
        assert_eq!(json, "\"quarter_year\"");
    }

    #[test]
    fn ordinal_matches_all_order() {
        for (i, mode) in ViewMode::ALL.iter().enumerate() {
            assert_eq!(mode.ordinal(), i);
        }
    }
}
