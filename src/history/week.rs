//! Newsletter week numbering
//!
//! Week 1 starts on the first Friday on or after January 1. Days before that
//! Friday still count as week 1 of the same year.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// (week, year) key shared by every cache series
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeekStamp {
    pub week: u32,
    pub year: i32,
}

/// First Friday on or after January 1 of the date's year
pub fn first_friday(date: NaiveDate) -> NaiveDate {
    let jan1 = date - Duration::days(date.ordinal0() as i64);
    let offset = (Weekday::Fri.num_days_from_monday() + 7 - jan1.weekday().num_days_from_monday()) % 7;
    jan1 + Duration::days(offset as i64)
}

impl WeekStamp {
    pub fn new(week: u32, year: i32) -> Self {
        Self { week, year }
    }

    pub fn for_date(date: NaiveDate) -> Self {
        let days = (date - first_friday(date)).num_days();
        let week = (days.div_euclid(7) + 1).max(1) as u32;
        Self {
            week,
            year: date.year(),
        }
    }

    /// Stamp for the local calendar date
    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }
}

impl fmt::Display for WeekStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week {} of {}", self.week, self.year)
    }
}

/// Week-over-week change in percent.
///
/// `None` when there is nothing meaningful to compare against.
pub fn week_over_week(current: f64, previous: Option<f64>) -> Option<f64> {
    match previous {
        Some(prev) if prev.is_finite() && prev > 0.0 => Some((current - prev) / prev * 100.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_friday() {
        // 2026-01-01 is a Thursday
        assert_eq!(first_friday(date(2026, 6, 15)), date(2026, 1, 2));
        // 2027-01-01 is a Friday
        assert_eq!(first_friday(date(2027, 3, 1)), date(2027, 1, 1));
        // 2025-01-01 is a Wednesday
        assert_eq!(first_friday(date(2025, 12, 31)), date(2025, 1, 3));
    }

    #[test]
    fn test_week_anchor() {
        assert_eq!(WeekStamp::for_date(date(2026, 1, 1)), WeekStamp::new(1, 2026));
        assert_eq!(WeekStamp::for_date(date(2026, 1, 2)), WeekStamp::new(1, 2026));
        assert_eq!(WeekStamp::for_date(date(2026, 1, 8)), WeekStamp::new(1, 2026));
        assert_eq!(WeekStamp::for_date(date(2026, 1, 9)), WeekStamp::new(2, 2026));
        assert_eq!(WeekStamp::for_date(date(2026, 12, 31)), WeekStamp::new(52, 2026));
        assert_eq!(WeekStamp::for_date(date(2027, 1, 1)), WeekStamp::new(1, 2027));
    }

    #[test]
    fn test_week_is_monotonic_within_year() {
        let mut day = date(2026, 1, 1);
        let mut last = WeekStamp::for_date(day);
        while day < date(2026, 12, 31) {
            day += Duration::days(1);
            let stamp = WeekStamp::for_date(day);
            assert!(stamp.week >= last.week);
            assert!(stamp.week - last.week <= 1);
            last = stamp;
        }
    }

    #[test]
    fn test_week_over_week() {
        assert!((week_over_week(110.0, Some(100.0)).unwrap() - 10.0).abs() < 1e-9);
        assert!((week_over_week(90.0, Some(100.0)).unwrap() + 10.0).abs() < 1e-9);
        assert_eq!(week_over_week(50.0, None), None);
        assert_eq!(week_over_week(50.0, Some(0.0)), None);
        assert_eq!(week_over_week(50.0, Some(-3.0)), None);
        assert_eq!(week_over_week(50.0, Some(f64::NAN)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(WeekStamp::new(7, 2026).to_string(), "week 7 of 2026");
    }
}
