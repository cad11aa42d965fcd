//! Configuration file support for Lift.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/lift/config.toml`.

use crate::report::MAX_WINDOW_DAYS;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub progression: ProgressionConfig,

    #[serde(default)]
    pub reports: ReportsConfig,
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

impl DataConfig {
    /// Path of the persisted tracker state inside the data directory
    pub fn state_path(&self) -> PathBuf {
        state_path_in(&self.data_dir)
    }
}

/// Location of `state.json` under a data directory
pub fn state_path_in(data_dir: &Path) -> PathBuf {
    data_dir.join("state.json")
}

/// Weight increments applied when every set of an exercise hits the top of its range
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressionConfig {
    #[serde(default = "default_compound_increment")]
    pub compound_increment: f64,

    #[serde(default = "default_isolation_increment")]
    pub isolation_increment: f64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            compound_increment: default_compound_increment(),
            isolation_increment: default_isolation_increment(),
        }
    }
}

/// Windows used by the reporting queries
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: i64,

    #[serde(default = "default_recent_session_limit")]
    pub recent_session_limit: usize,

    #[serde(default = "default_body_weight_days")]
    pub body_weight_days: i64,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            recent_window_days: default_recent_window_days(),
            recent_session_limit: default_recent_session_limit(),
            body_weight_days: default_body_weight_days(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lift")
}

fn default_compound_increment() -> f64 {
    5.0
}

fn default_isolation_increment() -> f64 {
    2.5
}

fn default_recent_window_days() -> i64 {
    14
}

fn default_recent_session_limit() -> usize {
    8
}

fn default_body_weight_days() -> i64 {
    30
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
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lift")
            .join("config.toml")
    }

    /// Reject values the progression and reporting code cannot work with
    pub fn validate(&self) -> Result<()> {
        let p = &self.progression;
        for (name, value) in [
            ("compound_increment", p.compound_increment),
            ("isolation_increment", p.isolation_increment),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "progression.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        let r = &self.reports;
        for (name, days) in [
            ("recent_window_days", r.recent_window_days),
            ("body_weight_days", r.body_weight_days),
        ] {
            if !(1..=MAX_WINDOW_DAYS).contains(&days) {
                return Err(Error::Config(format!(
                    "reports.{} must be between 1 and {}, got {}",
                    name, MAX_WINDOW_DAYS, days
                )));
            }
        }
        if r.recent_session_limit == 0 {
            return Err(Error::Config(
                "reports.recent_session_limit must be at least 1".into(),
            ));
        }
        Ok(())
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
