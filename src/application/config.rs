use std::path::PathBuf;

pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub theme: String,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = std::env::var("HABITUAL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("habitual")
            });

        let theme = std::env::var("HABITUAL_THEME").unwrap_or_else(|_| "dark".to_string());

        Self::with_data_dir(data_dir, theme)
    }

    pub fn with_data_dir(data_dir: PathBuf, theme: impl Into<String>) -> Self {
        let db_path = data_dir.join("habits.db");

        Self {
            data_dir,
            db_path,
            theme: theme.into(),
        }
    }
}
