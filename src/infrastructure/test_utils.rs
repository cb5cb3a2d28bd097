/// Test utilities for DuckDB-based tests
///
/// Every test gets a fresh database file in its own temporary directory,
/// removed when the harness is dropped.
///
/// ```rust,ignore
/// use crate::infrastructure::test_utils::test_harness::TestStorage;
///
/// #[test]
/// fn my_test() {
///     let test_storage = TestStorage::new();
///     let habit = test_storage.create_daily_habit("Walk").unwrap();
///     // ...
/// }
/// ```
#[cfg(test)]
pub mod test_harness {
    use crate::domain::{FrequencyPolicy, Habit};
    use crate::infrastructure::{DuckDbStorage, HabitRepository};
    use anyhow::Result;
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    pub struct TestStorage {
        pub storage: DuckDbStorage,
        _temp_dir: TempDir, // Keep temp dir alive
    }

    impl TestStorage {
        pub fn new() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp directory");
            let db_path = temp_dir.path().join("test.db");

            let storage =
                DuckDbStorage::new(&db_path).expect("Failed to initialize test DuckDB storage");

            Self {
                storage,
                _temp_dir: temp_dir,
            }
        }

        pub fn storage(&self) -> &DuckDbStorage {
            &self.storage
        }

        pub fn create_daily_habit(&self, name: &str) -> Result<Habit> {
            self.storage.create(name, FrequencyPolicy::Daily)
        }

        /// Log the habit on each of the given offsets (in days) before `today`
        pub fn log_days_before(
            &self,
            habit: &Habit,
            today: NaiveDate,
            offsets: &[i64],
        ) -> Result<()> {
            for offset in offsets {
                self.storage
                    .insert_log(habit.id, today - Duration::days(*offset))?;
            }
            Ok(())
        }
    }

    /// Run a test with fresh test storage
    pub fn with_test_storage<F, R>(test_fn: F) -> R
    where
        F: FnOnce(&TestStorage) -> R,
    {
        let test_storage = TestStorage::new();
        test_fn(&test_storage)
    }
}

#[cfg(test)]
mod tests {
    use super::test_harness::*;
    use crate::infrastructure::HabitRepository;
    use chrono::NaiveDate;

    #[test]
    fn test_harness_basic_functionality() {
        let test_storage = TestStorage::new();
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        assert!(test_storage.storage().list().unwrap().is_empty());

        let habit = test_storage.create_daily_habit("Walk").unwrap();
        test_storage.log_days_before(&habit, today, &[0, 1, 2]).unwrap();

        assert_eq!(test_storage.storage().log_dates_desc(habit.id).unwrap().len(), 3);
    }

    #[test]
    fn test_harness_with_function() {
        with_test_storage(|test_storage| {
            let habit = test_storage.create_daily_habit("Stretch").unwrap();
            assert_eq!(habit.name, "Stretch");
        });
    }

    #[test]
    fn test_harness_isolation() {
        let test_storage1 = TestStorage::new();
        let test_storage2 = TestStorage::new();

        test_storage1.create_daily_habit("Walk").unwrap();

        assert!(test_storage2.storage().list().unwrap().is_empty());
    }
}
