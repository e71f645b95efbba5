//! Configuration file support for HabitFlow.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/habitflow/config.toml`.

use crate::{Error, Result, StreakPolicy};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest accepted distance from UTC, just under one day
const MAX_OFFSET_MINUTES: u32 = 24 * 60 - 1;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub calendar: CalendarConfig,

    #[serde(default)]
    pub policy: StreakPolicy,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Reference time zone used to turn instants into calendar days
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CalendarConfig {
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("habitflow")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("habitflow").join("config.toml")
    }

    /// Reject settings the engine cannot use
    pub fn validate(&self) -> Result<()> {
        if self.calendar.utc_offset_minutes.unsigned_abs() > MAX_OFFSET_MINUTES {
            return Err(Error::Config(format!(
                "calendar.utc_offset_minutes must be within ±{}, got {}",
                MAX_OFFSET_MINUTES, self.calendar.utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// The fixed reference zone for calendar days
    pub fn reference_zone(&self) -> Result<FixedOffset> {
        let seconds = self.calendar.utc_offset_minutes.checked_mul(60);
        seconds.and_then(FixedOffset::east_opt).ok_or_else(|| {
            Error::Config(format!(
                "invalid UTC offset: {} minutes",
                self.calendar.utc_offset_minutes
            ))
        })
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
