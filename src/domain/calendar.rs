use crate::domain::StreakError;
use chrono::{Datelike, Duration, NaiveDate};

/// Wire format for log dates, shared with storage.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` string as a calendar date (UTC midnight).
///
/// Only the exact ten-character shape is accepted, so `2025-1-5` or
/// `2025-01-05T00:00:00Z` are rejected rather than silently reinterpreted.
pub fn parse_log_date(input: &str) -> Result<NaiveDate, StreakError> {
    let bytes = input.as_bytes();
    let well_shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !well_shaped {
        return Err(StreakError::invalid_date(input));
    }

    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| StreakError::invalid_date(input))
}

pub fn format_log_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Signed number of whole days from `b` to `a`. Positive when `a` is later.
pub fn day_distance(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days()
}

/// Day-of-week index, 0 = Sunday .. 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> i64 {
    date.weekday().num_days_from_sunday() as i64
}

/// The Sunday at or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(day_of_week(date))
}

pub fn same_week(a: NaiveDate, b: NaiveDate) -> bool {
    week_start(a) == week_start(b)
}

/// The seven dates (Sunday..Saturday) of the week containing `date`.
pub fn week_days(date: NaiveDate) -> Vec<NaiveDate> {
    let start = week_start(date);
    (0..7).map(|i| start + Duration::days(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_log_date(s).unwrap()
    }

    #[test]
    fn test_parse_accepts_iso_dates() {
        assert_eq!(
            parse_log_date("2025-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
        );
        assert_eq!(
            parse_log_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for bad in [
            "",
            "2025-1-5",
            "2025/01/15",
            "15-01-2025",
            "2025-01-15T00:00:00Z",
            "2025-13-01",
            "2025-02-30",
            "2023-02-29",
            "abcd-ef-gh",
        ] {
            assert_eq!(
                parse_log_date(bad),
                Err(StreakError::invalid_date(bad)),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_format_matches_parse() {
        let d = date("2025-03-09");
        assert_eq!(format_log_date(d), "2025-03-09");
    }

    #[test]
    fn test_day_distance_boundaries() {
        let x = date("2025-01-15");
        assert_eq!(day_distance(x, x), 0);
        assert_eq!(day_distance(x, date("2025-01-14")), 1);
        assert_eq!(day_distance(date("2025-01-14"), x), -1);
        assert_eq!(day_distance(x, date("2025-01-08")), 7);
    }

    #[test]
    fn test_day_distance_across_year_and_leap_day() {
        assert_eq!(day_distance(date("2025-01-01"), date("2024-12-31")), 1);
        assert_eq!(day_distance(date("2024-03-01"), date("2024-02-28")), 2);
        assert_eq!(day_distance(date("2023-03-01"), date("2023-02-28")), 1);
    }

    #[test]
    fn test_day_of_week_numbering_starts_on_sunday() {
        assert_eq!(day_of_week(date("2025-01-12")), 0); // Sun
        assert_eq!(day_of_week(date("2025-01-14")), 2); // Tue
        assert_eq!(day_of_week(date("2025-01-15")), 3); // Wed
        assert_eq!(day_of_week(date("2025-01-18")), 6); // Sat
    }

    #[test]
    fn test_week_start_is_sunday_at_or_before() {
        assert_eq!(week_start(date("2025-01-12")), date("2025-01-12"));
        assert_eq!(week_start(date("2025-01-15")), date("2025-01-12"));
        assert_eq!(week_start(date("2025-01-18")), date("2025-01-12"));
        assert_eq!(week_start(date("2025-01-02")), date("2024-12-29"));
    }

    #[test]
    fn test_same_week() {
        assert!(same_week(date("2025-01-12"), date("2025-01-18")));
        assert!(!same_week(date("2025-01-11"), date("2025-01-12")));
        assert!(same_week(date("2024-12-31"), date("2025-01-04")));
    }

    #[test]
    fn test_week_days_runs_sunday_to_saturday() {
        let days = week_days(date("2025-01-15"));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date("2025-01-12"));
        assert_eq!(days[6], date("2025-01-18"));
    }
}
