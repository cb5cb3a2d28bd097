use crate::domain::{FrequencyPolicy, LogHistory, streak_for};
use chrono::NaiveDate;
use serde::Serialize;

/// What a caller shows next to a habit: its streak and whether today is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HabitStatus {
    pub streak: u32,
    pub completed: bool,
}

pub fn is_completed_today(history: &LogHistory, today: NaiveDate) -> bool {
    history.contains(today)
}

/// Streak as displayed on a dashboard.
///
/// A daily run that has not been extended today reads as 0, even though the
/// calculator still reports the length of the last run.
pub fn display_streak(policy: &FrequencyPolicy, history: &LogHistory, today: NaiveDate) -> u32 {
    if matches!(policy, FrequencyPolicy::Daily) && !is_completed_today(history, today) {
        return 0;
    }
    streak_for(policy, history, today)
}

pub fn habit_status(policy: &FrequencyPolicy, history: &LogHistory, today: NaiveDate) -> HabitStatus {
    HabitStatus {
        streak: display_streak(policy, history, today),
        completed: is_completed_today(history, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::parse_log_date;

    fn history(dates: &[&str]) -> LogHistory {
        LogHistory::parse(dates).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        parse_log_date(s).unwrap()
    }

    #[test]
    fn test_completed_today_checks_for_today_entry() {
        let today = date("2025-01-15");
        assert!(is_completed_today(&history(&["2025-01-15", "2025-01-14"]), today));
        assert!(!is_completed_today(&history(&["2025-01-14"]), today));
        assert!(!is_completed_today(&LogHistory::default(), today));
    }

    #[test]
    fn test_daily_display_is_zero_until_logged_today() {
        let today = date("2025-01-15");
        let yesterday_run = history(&["2025-01-14", "2025-01-13"]);
        assert_eq!(display_streak(&FrequencyPolicy::Daily, &yesterday_run, today), 0);

        let live_run = history(&["2025-01-15", "2025-01-14", "2025-01-13"]);
        assert_eq!(display_streak(&FrequencyPolicy::Daily, &live_run, today), 3);
    }

    #[test]
    fn test_weekly_display_keeps_streak_without_today() {
        let today = date("2025-01-14");
        let logs = history(&["2025-01-13", "2025-01-07"]);
        assert_eq!(display_streak(&FrequencyPolicy::Weekly, &logs, today), 2);
    }

    #[test]
    fn test_habit_status_bundles_both() {
        let today = date("2025-01-15");
        let logs = history(&["2025-01-15", "2025-01-14"]);
        assert_eq!(
            habit_status(&FrequencyPolicy::Daily, &logs, today),
            HabitStatus {
                streak: 2,
                completed: true
            }
        );
        assert_eq!(
            habit_status(&FrequencyPolicy::Daily, &LogHistory::default(), today),
            HabitStatus {
                streak: 0,
                completed: false
            }
        );
    }
}
