//! Trailing window filter over date-ordered series.

use crate::core::period::Period;
use chrono::NaiveDate;

/// A point that belongs to a single calendar day.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// Returns the suffix of `series` whose dates fall on or after
/// `latest_date - period.lookback_days()`.
///
/// The cutoff is anchored on the series' own latest date, not on the wall
/// clock. `series` must be sorted ascending by date.
pub fn trailing_window<T: Dated + Clone>(series: &[T], period: Period) -> Vec<T> {
    let Some(latest) = series.last().map(Dated::date) else {
        return Vec::new();
    };
    let cutoff = latest - period.to_duration();
    let start = series.partition_point(|point| point.date() < cutoff);
    series[start..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Point(NaiveDate);

    impl Dated for Point {
        fn date(&self) -> NaiveDate {
            self.0
        }
    }

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 7).unwrap()
    }

    fn days_before_end(days: i64) -> Point {
        Point(end() - Duration::days(days))
    }

    #[test]
    fn test_one_month_excludes_older_points() {
        let series = vec![days_before_end(40), days_before_end(10), days_before_end(0)];
        let window = trailing_window(&series, Period::OneMonth);
        assert_eq!(window, vec![days_before_end(10), days_before_end(0)]);
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let series = vec![days_before_end(31), days_before_end(30), days_before_end(0)];
        let window = trailing_window(&series, Period::OneMonth);
        assert_eq!(window, vec![days_before_end(30), days_before_end(0)]);
    }

    #[test]
    fn test_cutoff_follows_series_not_today() {
        // A series ending years ago still keeps its own trailing month.
        let series = vec![
            Point(NaiveDate::from_ymd_opt(2019, 12, 1).unwrap()),
            Point(NaiveDate::from_ymd_opt(2020, 1, 15).unwrap()),
            Point(NaiveDate::from_ymd_opt(2020, 2, 1).unwrap()),
        ];
        let window = trailing_window(&series, Period::OneMonth);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_longer_periods() {
        let series = vec![
            days_before_end(800),
            days_before_end(700),
            days_before_end(365),
            days_before_end(100),
            days_before_end(0),
        ];
        assert_eq!(trailing_window(&series, Period::ThreeMonths).len(), 1);
        assert_eq!(trailing_window(&series, Period::SixMonths).len(), 2);
        assert_eq!(trailing_window(&series, Period::OneYear).len(), 3);
        assert_eq!(trailing_window(&series, Period::TwoYears).len(), 4);
    }

    #[test]
    fn test_empty_series() {
        let series: Vec<Point> = Vec::new();
        assert!(trailing_window(&series, Period::OneYear).is_empty());
    }
}
