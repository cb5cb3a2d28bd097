use crate::domain::{
    FrequencyPolicy, Habit, HabitId, HabitLog, HabitStatus, HabitSummary, LogHistory, LogOutcome,
    display_streak, habit_status, streak_for,
};
use crate::infrastructure::{CompletionChange, CompletionContext, HabitRepository, HookRegistry};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use std::path::PathBuf;

/// Habit bookkeeping on top of a repository: CRUD, marking days done, and
/// streaks as of a caller-supplied reference date.
pub struct Tracker {
    repository: Box<dyn HabitRepository>,
    hooks: HookRegistry,
    data_dir: PathBuf,
}

impl Tracker {
    pub fn new(repository: Box<dyn HabitRepository>) -> Self {
        Self {
            repository,
            hooks: HookRegistry::new(),
            data_dir: PathBuf::from("."),
        }
    }

    pub fn with_hooks(
        repository: Box<dyn HabitRepository>,
        hooks: HookRegistry,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            repository,
            hooks,
            data_dir,
        }
    }

    pub fn create_habit(&self, name: &str, policy: FrequencyPolicy) -> Result<Habit> {
        let name = validate_name(name)?;
        self.repository.create(name, policy)
    }

    pub fn habits(&self) -> Result<Vec<Habit>> {
        self.repository.list()
    }

    pub fn habit(&self, id: HabitId) -> Result<Option<Habit>> {
        self.repository.get(id)
    }

    pub fn require_habit(&self, id: HabitId) -> Result<Habit> {
        match self.repository.get(id)? {
            Some(habit) => Ok(habit),
            None => bail!("Habit not found: #{}", id),
        }
    }

    pub fn update_habit(&self, id: HabitId, name: &str, policy: FrequencyPolicy) -> Result<bool> {
        let name = validate_name(name)?;
        self.repository.update(id, name, policy)
    }

    pub fn delete_habit(&self, id: HabitId) -> Result<bool> {
        self.repository.delete(id)
    }

    pub fn history(&self, id: HabitId) -> Result<LogHistory> {
        Ok(LogHistory::new(self.repository.log_dates_desc(id)?))
    }

    pub fn logs(&self, id: HabitId) -> Result<Vec<HabitLog>> {
        self.require_habit(id)?;
        self.repository.logs(id)
    }

    /// Calculator streak, without the daily "not done today" display rule.
    pub fn streak(&self, id: HabitId, today: NaiveDate) -> Result<u32> {
        let habit = self.require_habit(id)?;
        Ok(streak_for(&habit.policy, &self.history(id)?, today))
    }

    pub fn status(&self, habit: &Habit, today: NaiveDate) -> Result<HabitStatus> {
        Ok(habit_status(&habit.policy, &self.history(habit.id)?, today))
    }

    pub fn summaries(&self, today: NaiveDate) -> Result<Vec<HabitSummary>> {
        self.habits()?
            .into_iter()
            .map(|habit| {
                let status = self.status(&habit, today)?;
                Ok(HabitSummary { habit, status })
            })
            .collect()
    }

    /// Log `date` as done and return the recomputed streak.
    pub fn mark_done(
        &self,
        id: HabitId,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(LogOutcome, u32)> {
        let habit = self.require_habit(id)?;

        let outcome = if self.repository.insert_log(id, date)? {
            log::info!("Logged habit #{} for {}", id, date);
            LogOutcome::Logged
        } else {
            log::debug!("Habit #{} already logged for {}", id, date);
            LogOutcome::AlreadyLogged
        };

        let streak = streak_for(&habit.policy, &self.history(id)?, today);
        if outcome == LogOutcome::Logged {
            self.notify(&habit, date, CompletionChange::Marked, streak);
        }

        Ok((outcome, streak))
    }

    /// Remove the log for `date`. Returns `None` when that day was not logged.
    pub fn unmark(&self, id: HabitId, date: NaiveDate, today: NaiveDate) -> Result<Option<u32>> {
        let habit = self.require_habit(id)?;

        if !self.repository.delete_log(id, date)? {
            return Ok(None);
        }
        log::info!("Removed log of habit #{} for {}", id, date);

        let streak = display_streak(&habit.policy, &self.history(id)?, today);
        self.notify(&habit, date, CompletionChange::Unmarked, streak);

        Ok(Some(streak))
    }

    /// Flip the log for `date` and report whether it is now logged.
    pub fn toggle(&self, id: HabitId, date: NaiveDate, today: NaiveDate) -> Result<bool> {
        if self.history(id)?.contains(date) {
            self.unmark(id, date, today)?;
            Ok(false)
        } else {
            self.mark_done(id, date, today)?;
            Ok(true)
        }
    }

    /// Logged days of a habit within `start..=end`, most recent first.
    pub fn completions_between(
        &self,
        id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        Ok(self
            .history(id)?
            .as_slice()
            .iter()
            .copied()
            .filter(|date| *date >= start && *date <= end)
            .collect())
    }

    fn notify(&self, habit: &Habit, date: NaiveDate, change: CompletionChange, streak: u32) {
        let context = CompletionContext {
            habit_id: habit.id,
            habit_name: habit.name.clone(),
            date,
            change,
            streak,
            data_dir: self.data_dir.clone(),
        };
        self.hooks.execute_completion_hooks(&context);
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Habit name is required");
    }
    Ok(name)
}
