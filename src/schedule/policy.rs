use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Elapsed months since manufacture are counted in fixed 30-day blocks by default.
pub const APPROX_DAYS_PER_MONTH: i64 = 30;

pub const MONTHS_PER_YEAR: u32 = 12;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Schedule bound when no whole month has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZeroElapsedPolicy {
    #[default]
    FullYear,
    SingleMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonthCounting {
    #[default]
    Approximate,
    Calendar,
}

impl MonthCounting {
    /// Whole months from `from` to `to`, floored. Negative when `from` is in the future.
    pub fn months_between(self, from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
        match self {
            MonthCounting::Approximate => (to - from)
                .num_milliseconds()
                .div_euclid(APPROX_DAYS_PER_MONTH * MILLIS_PER_DAY),
            MonthCounting::Calendar => {
                let mut months = i64::from(to.year() - from.year()) * 12
                    + i64::from(to.month()) - i64::from(from.month());
                if (to.day(), to.time()) < (from.day(), from.time()) {
                    months -= 1;
                }
                months
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePolicy {
    pub zero_elapsed: ZeroElapsedPolicy,
    pub month_counting: MonthCounting,
    /// Clamp emitted totals at zero once the asset is fully depreciated.
    pub floor_at_zero: bool,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        SchedulePolicy {
            zero_elapsed: ZeroElapsedPolicy::FullYear,
            month_counting: MonthCounting::Approximate,
            floor_at_zero: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn approximate_counting_uses_thirty_day_blocks() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let count = |days: i64| {
            MonthCounting::Approximate.months_between(now - Duration::days(days), now)
        };

        assert_eq!(count(0), 0);
        assert_eq!(count(29), 0);
        assert_eq!(count(30), 1);
        assert_eq!(count(65), 2);
        assert_eq!(count(400), 13);
    }

    #[test]
    fn approximate_counting_floors_future_dates() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        assert_eq!(
            MonthCounting::Approximate.months_between(now + Duration::days(10), now),
            -1
        );
    }

    #[test]
    fn calendar_counting_waits_for_day_of_month() {
        let mfd = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2024, 3, 19, 23, 0, 0).unwrap();
        let on = Utc.with_ymd_and_hms(2024, 3, 20, 0, 0, 0).unwrap();

        assert_eq!(MonthCounting::Calendar.months_between(mfd, before), 1);
        assert_eq!(MonthCounting::Calendar.months_between(mfd, on), 2);
        assert_eq!(MonthCounting::Calendar.months_between(on, mfd), -2);
    }

    #[test]
    fn calendar_counting_crosses_year_boundary() {
        let mfd = Utc.with_ymd_and_hms(2023, 11, 5, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap();
        assert_eq!(MonthCounting::Calendar.months_between(mfd, now), 3);
    }
}
