use crate::application::{Config, Theme, WeekBoard};
use crate::domain::{FrequencyPolicy, HabitId, HabitSummary, LogOutcome, Tracker};
use crate::infrastructure::{CompletionHook, DuckDbStorage, HookRegistry, SimpleLoggerHook};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;

pub struct HabitApp {
    pub tracker: Tracker,
    config: Config,
}

impl HabitApp {
    pub fn new() -> Result<Self> {
        Self::with_default_plugins(Config::from_env())
    }

    pub fn with_default_plugins(config: Config) -> Result<Self> {
        let plugins: Vec<Box<dyn CompletionHook>> = vec![Box::new(SimpleLoggerHook)];
        let hook_registry = HookRegistry::with_defaults(plugins);

        let storage = DuckDbStorage::new(&config.db_path)
            .with_context(|| format!("Failed to open {}", config.db_path.display()))?;
        let tracker =
            Tracker::with_hooks(Box::new(storage), hook_registry, config.data_dir.clone());

        Ok(Self { tracker, config })
    }

    pub fn add_habit(&self, name: &str, policy: FrequencyPolicy) -> Result<String> {
        let habit = self.tracker.create_habit(name, policy)?;
        Ok(format!("Created habit #{} '{}' ({})", habit.id, habit.name, habit.policy))
    }

    pub fn edit_habit(&self, id: HabitId, name: &str, policy: FrequencyPolicy) -> Result<String> {
        if !self.tracker.update_habit(id, name, policy)? {
            bail!("Habit not found: #{}", id);
        }
        Ok(format!("Updated habit #{}", id))
    }

    pub fn remove_habit(&self, id: HabitId) -> Result<String> {
        if !self.tracker.delete_habit(id)? {
            bail!("Habit not found: #{}", id);
        }
        Ok(format!("Deleted habit #{}", id))
    }

    pub fn mark_done(&self, id: HabitId, date: NaiveDate, today: NaiveDate) -> Result<String> {
        let (outcome, streak) = self.tracker.mark_done(id, date, today)?;
        let prefix = match outcome {
            LogOutcome::Logged => format!("Logged habit #{} for {}", id, date),
            LogOutcome::AlreadyLogged => format!("Habit #{} was already logged for {}", id, date),
        };
        Ok(format!("{} - streak: {}", prefix, streak))
    }

    pub fn unmark(&self, id: HabitId, date: NaiveDate, today: NaiveDate) -> Result<String> {
        match self.tracker.unmark(id, date, today)? {
            Some(streak) => Ok(format!(
                "Removed log of habit #{} for {} - streak: {}",
                id, date, streak
            )),
            None => bail!("Log not found for habit #{} on {}", id, date),
        }
    }

    pub fn streak(&self, id: HabitId, today: NaiveDate) -> Result<String> {
        Ok(self.tracker.streak(id, today)?.to_string())
    }

    pub fn logs(&self, id: HabitId) -> Result<String> {
        let logs = self.tracker.logs(id)?;
        if logs.is_empty() {
            return Ok(format!("No logs for habit #{}", id));
        }

        Ok(logs
            .iter()
            .map(|log| format!("{}  {}", log.date, log.status))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub fn list(&self, today: NaiveDate, json: bool) -> Result<String> {
        let summaries = self.tracker.summaries(today)?;
        if json {
            return serde_json::to_string_pretty(&summaries).context("Failed to serialize habits");
        }
        Ok(render_summaries(&summaries))
    }

    pub fn run_board(&self, today: NaiveDate) -> Result<()> {
        let theme = Theme::by_name(&self.config.theme);
        let mut board = WeekBoard::new(today, &self.tracker, theme)?;
        board.run()?;
        Ok(())
    }
}

fn render_summaries(summaries: &[HabitSummary]) -> String {
    if summaries.is_empty() {
        return "No habits yet. Add one with `habitual add <name>`.".to_string();
    }

    let name_width = summaries
        .iter()
        .map(|s| s.habit.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Habit".len());

    let mut lines = vec![format!(
        "{:>4}  {:<name_width$}  {:<10}  {:>6}  {}",
        "ID", "Habit", "Frequency", "Streak", "Today"
    )];
    for summary in summaries {
        lines.push(format!(
            "{:>4}  {:<name_width$}  {:<10}  {:>6}  {}",
            summary.habit.id,
            summary.habit.name,
            summary.habit.policy.to_string(),
            summary.status.streak,
            if summary.status.completed { "✓" } else { "·" }
        ));
    }
    lines.join("\n")
}
