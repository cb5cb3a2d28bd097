use crate::domain::{FrequencyPolicy, Habit, HabitId, HabitLog};
use anyhow::Result;
use chrono::NaiveDate;

/// Storage for habits and their completion logs.
pub trait HabitRepository {
    fn create(&self, name: &str, policy: FrequencyPolicy) -> Result<Habit>;
    fn list(&self) -> Result<Vec<Habit>>;
    fn get(&self, id: HabitId) -> Result<Option<Habit>>;
    /// Returns `false` when no habit has this id.
    fn update(&self, id: HabitId, name: &str, policy: FrequencyPolicy) -> Result<bool>;
    /// Removes the habit and its logs. Returns `false` when no habit has this id.
    fn delete(&self, id: HabitId) -> Result<bool>;

    /// Returns `false` when the day was already logged.
    fn insert_log(&self, id: HabitId, date: NaiveDate) -> Result<bool>;
    /// Returns `false` when there was no log for that day.
    fn delete_log(&self, id: HabitId, date: NaiveDate) -> Result<bool>;
    /// Logged days, most recent first.
    fn log_dates_desc(&self, id: HabitId) -> Result<Vec<NaiveDate>>;
    fn logs(&self, id: HabitId) -> Result<Vec<HabitLog>>;
}
