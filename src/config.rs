//! Application configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::clock::DEFAULT_INITIAL_SECONDS;

pub const CONFIG_FILE_NAME: &str = "chessclock.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Directory holding the database and this config file.
    pub data_dir: PathBuf,

    pub database_file: String,

    /// Starting time for both game clocks and the practice clock.
    pub initial_seconds: u32,

    pub tick_interval_ms: u64,

    /// Log filter (e.g. "info", "chessclock_lib=debug,warn").
    pub log_level: String,

    /// Buffered events per subscriber before slow subscribers start lagging.
    pub event_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            database_file: "chessclock.sqlite3".to_string(),
            initial_seconds: DEFAULT_INITIAL_SECONDS,
            tick_interval_ms: 1_000,
            log_level: "info".to_string(),
            event_capacity: 64,
        }
    }
}

impl AppConfig {
    /// Reads `chessclock.json` from `data_dir` when present. Missing fields
    /// take their defaults; `data_dir` always points at the directory given.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str::<AppConfig>(&contents)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        } else {
            AppConfig::default()
        };

        config.data_dir = data_dir.to_path_buf();
        if debug_mode() {
            config.log_level = "debug".to_string();
        }
        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

fn debug_mode() -> bool {
    std::env::var("CHESSCLOCK_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
