use crate::application::HabitApp;
use crate::domain::calendar::parse_log_date;
use crate::domain::{FrequencyPolicy, HabitId};
use anyhow::{Context, bail};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "habitual")]
#[command(about = "Track habits and their streaks from the terminal")]
#[command(version)]
pub struct Cli {
    /// Reference date for streaks (YYYY-MM-DD, defaults to today in UTC)
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new habit
    Add {
        name: String,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// List habits with their current streak
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Rename a habit or change its frequency
    Edit {
        id: HabitId,
        name: String,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Delete a habit and all of its logs
    Remove { id: HabitId },
    /// Mark a habit as done
    Done {
        id: HabitId,
        /// Specific date (YYYY-MM-DD format, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Remove a habit's log for a day
    Undo {
        id: HabitId,
        /// Specific date (YYYY-MM-DD format, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Print a habit's streak
    Streak { id: HabitId },
    /// Show every logged day of a habit
    Logs { id: HabitId },
    /// Start the interactive week board
    Board,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Frequency {
    Daily,
    Weekly,
    Custom,
}

#[derive(Debug, Clone, Args)]
pub struct PolicyArgs {
    /// How often the habit should be done
    #[arg(short, long, value_enum, default_value_t = Frequency::Daily)]
    pub frequency: Frequency,

    /// Times per week, required for custom habits (1-7)
    #[arg(short, long)]
    pub times: Option<i64>,
}

impl PolicyArgs {
    pub fn policy(&self) -> anyhow::Result<FrequencyPolicy> {
        let policy = match self.frequency {
            Frequency::Daily => FrequencyPolicy::Daily,
            Frequency::Weekly => FrequencyPolicy::Weekly,
            Frequency::Custom => match self.times {
                Some(times) => FrequencyPolicy::custom(times)?,
                None => bail!("--times is required for custom habits"),
            },
        };

        if self.times.is_some() && self.frequency != Frequency::Custom {
            log::warn!("--times only applies to custom habits, ignoring it");
        }

        Ok(policy)
    }
}

impl Cli {
    pub fn run() -> anyhow::Result<()> {
        let cli = Self::parse();

        let log_level = if cli.verbose { "debug" } else { "warn" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();

        cli.execute()
    }

    pub fn execute(self) -> anyhow::Result<()> {
        let today = self.reference_date()?;
        let app = HabitApp::new()?;

        let output = match self.command {
            Some(Commands::Add { name, policy }) => app.add_habit(&name, policy.policy()?)?,
            Some(Commands::List { json }) => app.list(today, json)?,
            Some(Commands::Edit { id, name, policy }) => {
                app.edit_habit(id, &name, policy.policy()?)?
            }
            Some(Commands::Remove { id }) => app.remove_habit(id)?,
            Some(Commands::Done { id, date }) => {
                let date = date_or_today(date.as_deref(), today)?;
                app.mark_done(id, date, today)?
            }
            Some(Commands::Undo { id, date }) => {
                let date = date_or_today(date.as_deref(), today)?;
                app.unmark(id, date, today)?
            }
            Some(Commands::Streak { id }) => app.streak(id, today)?,
            Some(Commands::Logs { id }) => app.logs(id)?,
            // Default: start the week board
            Some(Commands::Board) | None => {
                app.run_board(today)?;
                return Ok(());
            }
        };

        println!("{}", output);
        Ok(())
    }

    fn reference_date(&self) -> anyhow::Result<NaiveDate> {
        date_or_today(self.today.as_deref(), Utc::now().date_naive())
    }
}

fn date_or_today(date: Option<&str>, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    match date {
        Some(date_str) => {
            parse_log_date(date_str).with_context(|| format!("Invalid date {:?}", date_str))
        }
        None => Ok(today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_custom_habit() {
        let cli = Cli::try_parse_from([
            "habitual", "add", "Gym", "--frequency", "custom", "--times", "3",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Add { name, policy }) => {
                assert_eq!(name, "Gym");
                assert_eq!(policy.policy().unwrap(), FrequencyPolicy::custom(3).unwrap());
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_custom_requires_times_in_range() {
        let missing = PolicyArgs {
            frequency: Frequency::Custom,
            times: None,
        };
        assert!(missing.policy().is_err());

        let too_many = PolicyArgs {
            frequency: Frequency::Custom,
            times: Some(8),
        };
        assert!(too_many.policy().is_err());

        let weekly = PolicyArgs {
            frequency: Frequency::Weekly,
            times: Some(3),
        };
        assert_eq!(weekly.policy().unwrap(), FrequencyPolicy::Weekly);
    }

    #[test]
    fn test_global_today_flag() {
        let cli = Cli::try_parse_from(["habitual", "list", "--today", "2025-01-15"]).unwrap();
        assert_eq!(
            cli.reference_date().unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
        );

        let cli = Cli::try_parse_from(["habitual", "--today", "15/01/2025"]).unwrap();
        assert!(cli.reference_date().is_err());
    }

    #[test]
    fn test_done_date_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(date_or_today(None, today).unwrap(), today);
        assert_eq!(
            date_or_today(Some("2025-01-10"), today).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
        );
        assert!(date_or_today(Some("yesterday"), today).is_err());
    }
}
