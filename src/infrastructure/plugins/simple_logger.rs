use crate::infrastructure::{CompletionChange, CompletionContext, CompletionHook};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;

pub const ACTIVITY_LOG_FILE: &str = "activity_log.txt";

/// Plugin that appends every mark/unmark to a plain-text activity log
pub struct SimpleLoggerHook;

impl CompletionHook for SimpleLoggerHook {
    fn on_completion_changed(&self, context: &CompletionContext) -> Result<()> {
        std::fs::create_dir_all(&context.data_dir)?;
        let log_path = context.data_dir.join(ACTIVITY_LOG_FILE);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open {}", log_path.display()))?;

        let action = match context.change {
            CompletionChange::Marked => "marked",
            CompletionChange::Unmarked => "unmarked",
        };

        writeln!(
            file,
            "[{}] Habit #{} '{}' {} for {} - streak now {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            context.habit_id,
            context.habit_name,
            action,
            context.date,
            context.streak
        )?;

        Ok(())
    }

    fn name(&self) -> &str {
        "Simple Logger"
    }
}
