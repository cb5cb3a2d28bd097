use crate::domain::calendar::{day_distance, day_of_week, parse_log_date, same_week};
use crate::domain::{FrequencyPolicy, StreakError, WeeklyTarget};
use chrono::NaiveDate;

/// A habit's completion dates, most recent first, one entry per day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogHistory {
    dates: Vec<NaiveDate>,
}

impl LogHistory {
    /// Sorts descending and drops duplicate days.
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        Self { dates }
    }

    pub fn parse<S: AsRef<str>>(dates: &[S]) -> Result<Self, StreakError> {
        let parsed = dates
            .iter()
            .map(|date| parse_log_date(date.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(parsed))
    }

    pub fn latest(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.binary_search_by(|probe| date.cmp(probe)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn as_slice(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Entries on or before `today`.
    fn up_to(&self, today: NaiveDate) -> &[NaiveDate] {
        let future = self.dates.partition_point(|date| *date > today);
        &self.dates[future..]
    }
}

impl FromIterator<NaiveDate> for LogHistory {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Streak for ISO date strings as handed over by the storage layer.
///
/// Fails on the first malformed date instead of reporting a streak.
pub fn compute_streak<S: AsRef<str>>(
    policy: &FrequencyPolicy,
    log_dates_desc: &[S],
    today: &str,
) -> Result<u32, StreakError> {
    let today = parse_log_date(today)?;
    let history = LogHistory::parse(log_dates_desc)?;
    Ok(streak_for(policy, &history, today))
}

/// Number of consecutive qualifying periods, most recent first.
///
/// Logs dated after `today` are ignored.
pub fn streak_for(policy: &FrequencyPolicy, history: &LogHistory, today: NaiveDate) -> u32 {
    let dates = history.up_to(today);
    if dates.is_empty() {
        return 0;
    }

    match policy {
        FrequencyPolicy::Daily => daily_streak(dates),
        FrequencyPolicy::Weekly => weekly_streak(dates, today),
        FrequencyPolicy::Custom(target) => custom_streak(dates, *target, today),
    }
}

/// Whether the current week can still reach `target` logs.
///
/// `days_this_week` is what has been logged so far this week and `dow` is
/// today's day-of-week index (0 = Sunday). An unlogged today still counts
/// as a remaining day only through the stricter first bound.
pub fn week_has_potential(target: i64, days_this_week: i64, dow: i64, today_logged: bool) -> bool {
    let missing = target - days_this_week;
    missing < 6 - dow || (missing < 7 - dow && today_logged)
}

/// The current week keeps the run alive if it already met its target or
/// can still meet it.
pub fn current_week_alive(target: i64, days_this_week: i64, dow: i64, today_logged: bool) -> bool {
    days_this_week >= target || week_has_potential(target, days_this_week, dow, today_logged)
}

fn daily_streak(dates: &[NaiveDate]) -> u32 {
    let mut streak = 1;
    for pair in dates.windows(2) {
        if day_distance(pair[0], pair[1]) != 1 {
            break;
        }
        streak += 1;
    }
    streak
}

fn weekly_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    // The current week plus one full week before a miss counts as a break.
    let grace = 7 + day_of_week(today);

    if day_distance(today, dates[0]) > grace {
        log::debug!("weekly streak broken: last log {} is older than {} days", dates[0], grace);
        return 0;
    }

    let mut streak = 1;
    for pair in dates.windows(2) {
        let (newer, older) = (pair[0], pair[1]);
        if same_week(newer, older) {
            continue;
        }
        if day_distance(newer, older) > grace {
            break;
        }
        streak += 1;
    }
    streak
}

fn custom_streak(dates: &[NaiveDate], target: WeeklyTarget, today: NaiveDate) -> u32 {
    let target = target.get() as i64;
    let dow = day_of_week(today);
    let grace = dow + 7;
    let latest = dates[0];

    let days_this_week = dates
        .iter()
        .take_while(|date| same_week(today, **date))
        .count();

    if dates.len() == 1 && target == 1 {
        return u32::from(day_distance(today, latest) <= grace);
    }

    if day_distance(today, latest) > grace {
        log::debug!("custom streak broken: last log {} is older than {} days", latest, grace);
        return 0;
    }

    let today_logged = latest == today;
    if !current_week_alive(target, days_this_week as i64, dow, today_logged) {
        log::debug!(
            "custom streak broken: {} of {} logs this week with {} days left",
            days_this_week,
            target,
            6 - dow
        );
        return 0;
    }

    let mut streak = u32::from(days_this_week as i64 >= target);

    // The current week's count carries into the first older week. The
    // oldest entry always closes its week.
    let mut week_count = days_this_week as i64;
    let mut days_passed = 0;
    for (i, &newer) in dates.iter().enumerate().skip(days_this_week) {
        week_count += 1;

        if let Some(&older) = dates.get(i + 1) {
            days_passed += day_distance(newer, older);
            if days_passed < 7 {
                continue;
            }
        }

        if week_count < target {
            break;
        }
        streak += 1;
        week_count = 1;
        days_passed = 0;
    }

    streak
}
