use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    errors::Result,
    ledger::WeekStart,
    utils::paths::{app_data_dir, config_file_in, ensure_dir},
};

const TMP_SUFFIX: &str = "json.tmp";
const DEFAULT_REMINDER_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub week_start: WeekStart,
    #[serde(default = "Config::default_reminder_window")]
    pub reminder_window_days: i64,
}

impl Config {
    fn default_reminder_window() -> i64 {
        DEFAULT_REMINDER_WINDOW_DAYS
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            week_start: WeekStart::default(),
            reminder_window_days: DEFAULT_REMINDER_WINDOW_DAYS,
        }
    }
}

/// Loads and saves `config.json` under the data directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields the defaults.
    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension(TMP_SUFFIX);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
