use crate::domain::calendar::{DATE_FORMAT, format_log_date};
use crate::domain::{FrequencyPolicy, Habit, HabitId, HabitLog, LogStatus};
use crate::infrastructure::HabitRepository;
use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use duckdb::{Connection, OptionalExt, params};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Versioned schema migrations, applied in order.
const MIGRATIONS: &[(i32, &str, &str)] = &[(
    1,
    "001_create_habits",
    include_str!("../../migrations/001_create_habits.sql"),
)];

const HABIT_COLUMNS: &str = "id, name, frequency_type, times_per_week, created_at";

type HabitRow = (i64, String, String, i64, String);

pub struct DuckDbStorage {
    conn: Mutex<Connection>,
}

impl DuckDbStorage {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }

        let conn = Connection::open(db_path).context("Failed to open DuckDB connection")?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .context("Failed to create in-memory DuckDB connection")?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize()?;
        Ok(storage)
    }

    fn initialize(&self) -> Result<()> {
        self.setup_migration_system()?;
        self.run_migrations()?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("DuckDB connection lock poisoned"))
    }

    fn habit_from_row(row: HabitRow) -> Result<Habit> {
        let (id, name, frequency_type, times_per_week, created_at) = row;
        let policy = FrequencyPolicy::from_parts(&frequency_type, times_per_week)
            .with_context(|| format!("Habit {} has an invalid frequency policy", id))?;
        let created_at = NaiveDateTime::parse_from_str(&created_at, TIMESTAMP_FORMAT)
            .with_context(|| format!("Failed to parse creation time of habit {}", id))?;

        Ok(Habit {
            id,
            name,
            policy,
            created_at,
        })
    }

    fn read_habit_row(row: &duckdb::Row<'_>) -> duckdb::Result<HabitRow> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    }
}

impl HabitRepository for DuckDbStorage {
    fn create(&self, name: &str, policy: FrequencyPolicy) -> Result<Habit> {
        let conn = self.conn()?;
        let created_at = chrono::Utc::now().naive_utc();

        let id: i64 = conn
            .query_row("SELECT nextval('habit_id_seq')", [], |row| row.get(0))
            .context("Failed to allocate habit id")?;

        conn.execute(
            "INSERT INTO habits (id, name, frequency_type, times_per_week, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                id,
                name,
                policy.frequency_type(),
                policy.times_per_week() as i64,
                created_at.format(TIMESTAMP_FORMAT).to_string()
            ],
        )
        .context("Failed to insert habit")?;

        log::info!("Created habit #{} '{}' ({})", id, name, policy);

        // Read back so the stored second-precision timestamp is returned.
        let row = conn
            .query_row(
                &format!("SELECT {} FROM habits WHERE id = ?", HABIT_COLUMNS),
                params![id],
                Self::read_habit_row,
            )
            .context("Failed to read back created habit")?;
        Self::habit_from_row(row)
    }

    fn list(&self) -> Result<Vec<Habit>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM habits ORDER BY id", HABIT_COLUMNS))
            .context("Failed to prepare select statement")?;

        let rows = stmt.query_map([], Self::read_habit_row)?;

        let mut habits = Vec::new();
        for row in rows {
            habits.push(Self::habit_from_row(row?)?);
        }

        Ok(habits)
    }

    fn get(&self, id: HabitId) -> Result<Option<Habit>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM habits WHERE id = ?", HABIT_COLUMNS),
                params![id],
                Self::read_habit_row,
            )
            .optional()
            .context("Failed to load habit")?;

        row.map(Self::habit_from_row).transpose()
    }

    fn update(&self, id: HabitId, name: &str, policy: FrequencyPolicy) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE habits SET name = ?, frequency_type = ?, times_per_week = ? WHERE id = ?",
                params![
                    name,
                    policy.frequency_type(),
                    policy.times_per_week() as i64,
                    id
                ],
            )
            .context("Failed to update habit")?;

        Ok(changed > 0)
    }

    fn delete(&self, id: HabitId) -> Result<bool> {
        let mut conn = self.conn()?;
        // Logs and habit go together; dropping the transaction early rolls back.
        let tx = conn
            .transaction()
            .context("Failed to begin delete transaction")?;

        tx.execute("DELETE FROM habit_logs WHERE habit_id = ?", params![id])
            .context("Failed to delete habit logs")?;
        let changed = tx
            .execute("DELETE FROM habits WHERE id = ?", params![id])
            .context("Failed to delete habit")?;

        tx.commit().context("Failed to commit habit delete")?;
        Ok(changed > 0)
    }

    fn insert_log(&self, id: HabitId, date: NaiveDate) -> Result<bool> {
        let conn = self.conn()?;
        let date_str = format_log_date(date);

        let existing: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM habit_logs WHERE habit_id = ? AND log_date = ?",
                params![id, date_str],
                |row| row.get(0),
            )
            .context("Failed to check for an existing log")?;

        if existing > 0 {
            return Ok(false);
        }

        conn.execute(
            "INSERT INTO habit_logs (habit_id, log_date, status) VALUES (?, ?, ?)",
            params![id, date_str, LogStatus::Completed.as_str()],
        )
        .context("Failed to insert habit log")?;

        Ok(true)
    }

    fn delete_log(&self, id: HabitId, date: NaiveDate) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "DELETE FROM habit_logs WHERE habit_id = ? AND log_date = ?",
                params![id, format_log_date(date)],
            )
            .context("Failed to delete habit log")?;

        Ok(changed > 0)
    }

    fn log_dates_desc(&self, id: HabitId) -> Result<Vec<NaiveDate>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT log_date FROM habit_logs WHERE habit_id = ? ORDER BY log_date DESC")
            .context("Failed to prepare select statement")?;

        let rows = stmt.query_map(params![id], |row| {
            let date_str: String = row.get(0)?;
            Ok(date_str)
        })?;

        let mut dates = Vec::new();
        for date_str in rows {
            let date_str = date_str?;
            let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .context("Failed to parse date from database")?;
            dates.push(date);
        }

        Ok(dates)
    }

    fn logs(&self, id: HabitId) -> Result<Vec<HabitLog>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, habit_id, log_date, status FROM habit_logs WHERE habit_id = ? ORDER BY log_date DESC",
            )
            .context("Failed to prepare select statement")?;

        let rows = stmt.query_map(params![id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut logs = Vec::new();
        for row in rows {
            let (log_id, habit_id, date_str, status) = row?;
            let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .context("Failed to parse date from database")?;
            let status = LogStatus::parse(&status)
                .ok_or_else(|| anyhow!("Unknown log status {:?} for log {}", status, log_id))?;
            logs.push(HabitLog {
                id: log_id,
                habit_id,
                date,
                status,
            });
        }

        Ok(logs)
    }
}

impl DuckDbStorage {
    fn setup_migration_system(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
        "#,
        )
        .context("Failed to create migrations table")?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        let applied = self.get_applied_migrations()?;

        for (version, name, sql_content) in MIGRATIONS {
            if !applied.contains(version) {
                self.apply_migration(*version, name, sql_content)
                    .with_context(|| format!("Failed to apply migration {}: {}", version, name))?;
            }
        }

        Ok(())
    }

    fn get_applied_migrations(&self) -> Result<HashSet<i32>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT version FROM migrations ORDER BY version")
            .context("Failed to prepare migration query")?;

        let rows = stmt.query_map([], |row| {
            let version: i32 = row.get(0)?;
            Ok(version)
        })?;

        let mut applied = HashSet::new();
        for version in rows {
            applied.insert(version?);
        }

        Ok(applied)
    }

    fn apply_migration(&self, version: i32, name: &str, sql_content: &str) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(sql_content)
            .with_context(|| format!("Failed to execute migration SQL for {}", name))?;

        conn.execute(
            "INSERT INTO migrations (version, name) VALUES (?, ?)",
            params![version, name],
        )
        .with_context(|| format!("Failed to record migration {} as applied", name))?;

        log::debug!("Applied migration {}", name);
        Ok(())
    }
}
