//! Calendar period arithmetic on local dates.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Calendar unit used to find period starts and to step between periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    Week,
    Month,
    Quarter,
    Year,
}

impl PeriodUnit {
    /// First day of the period containing `date`.
    ///
    /// Weeks start on `week_start`; the other units ignore it.
    pub fn start_of(&self, date: NaiveDate, week_start: Weekday) -> Option<NaiveDate> {
        match self {
            Self::Week => {
                let offset = (7 + date.weekday().num_days_from_sunday()
                    - week_start.num_days_from_sunday())
                    % 7;
                date.checked_sub_days(Days::new(offset as u64))
            }
            Self::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
            Self::Quarter => {
                NaiveDate::from_ymd_opt(date.year(), date.month0() / 3 * 3 + 1, 1)
            }
            Self::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        }
    }

    /// Moves `date` by `steps` units; negative steps go back in time.
    pub fn shift(&self, date: NaiveDate, steps: i64) -> Option<NaiveDate> {
        let magnitude = steps.unsigned_abs();
        match self {
            Self::Week => {
                let days = Days::new(magnitude.checked_mul(7)?);
                if steps >= 0 {
                    date.checked_add_days(days)
                } else {
                    date.checked_sub_days(days)
                }
            }
            Self::Month | Self::Quarter | Self::Year => {
                let per_unit = match self {
                    Self::Quarter => 3,
                    Self::Year => 12,
                    _ => 1,
                };
                let months = Months::new(u32::try_from(magnitude.checked_mul(per_unit)?).ok()?);
                if steps >= 0 {
                    date.checked_add_months(months)
                } else {
                    date.checked_sub_months(months)
                }
            }
        }
    }
}
