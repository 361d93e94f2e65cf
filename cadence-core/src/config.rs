//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/cadence/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/cadence/` (~/.config/cadence/)
//! - Data: `$XDG_DATA_HOME/cadence/` (~/.local/share/cadence/)
//! - State/Logs: `$XDG_STATE_HOME/cadence/` (~/.local/state/cadence/)
//!
//! The `[targets]` section is the user-editable source of daily/weekly
//! target hours and excluded weekdays, with per-project overrides:
//!
//! ```toml
//! [targets]
//! daily_hours = 2.0
//! weekly_hours = 12.0
//! excluded_weekdays = [6, 7]
//!
//! [targets.projects."side-project"]
//! daily_hours = 0.5
//! excluded_weekdays = []
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::store::TargetSource;
use crate::types::{PeriodKind, Subject, TargetSpec};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Target hours and excluded weekdays
    #[serde(default)]
    pub targets: TargetsConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Target configuration for the aggregate subject, with per-project
/// overrides. Absent hours mean "any activity qualifies".
#[derive(Debug, Deserialize, Default)]
pub struct TargetsConfig {
    /// Daily target in hours
    pub daily_hours: Option<f64>,

    /// Weekly target in hours
    pub weekly_hours: Option<f64>,

    /// ISO weekday numbers (1=Monday..7=Sunday) skipped by the daily streak
    #[serde(default)]
    pub excluded_weekdays: Vec<u8>,

    /// Per-project overrides, keyed by project name
    #[serde(default)]
    pub projects: HashMap<String, ProjectTargets>,
}

/// Target overrides for one project. Unset fields inherit the aggregate
/// defaults.
#[derive(Debug, Deserialize, Default)]
pub struct ProjectTargets {
    pub daily_hours: Option<f64>,
    pub weekly_hours: Option<f64>,
    pub excluded_weekdays: Option<Vec<u8>>,
}

impl TargetsConfig {
    /// Resolve the target spec for a (subject, kind) pair.
    pub fn spec_for(&self, subject: &Subject, kind: PeriodKind) -> TargetSpec {
        let (daily, weekly, excluded) = match subject {
            Subject::Aggregate => (
                self.daily_hours,
                self.weekly_hours,
                self.excluded_weekdays.clone(),
            ),
            Subject::Project(name) => match self.projects.get(name) {
                Some(overrides) => (
                    overrides.daily_hours.or(self.daily_hours),
                    overrides.weekly_hours.or(self.weekly_hours),
                    overrides
                        .excluded_weekdays
                        .clone()
                        .unwrap_or_else(|| self.excluded_weekdays.clone()),
                ),
                None => (
                    self.daily_hours,
                    self.weekly_hours,
                    self.excluded_weekdays.clone(),
                ),
            },
        };

        match kind {
            PeriodKind::Day => TargetSpec::new(daily, excluded),
            PeriodKind::Week => TargetSpec::new(weekly, []),
            // Month and year periods never carry a target
            PeriodKind::Month | PeriodKind::Year => TargetSpec::unbounded(),
        }
    }
}

impl TargetSource for Config {
    fn target_spec(&self, subject: &Subject, kind: PeriodKind) -> Result<TargetSpec> {
        Ok(self.targets.spec_for(subject, kind))
    }
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/cadence/config.toml` (~/.config/cadence/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("cadence").join("config.toml")
    }

    /// Returns the data directory path (for the checkpoint database)
    ///
    /// `$XDG_DATA_HOME/cadence/` (~/.local/share/cadence/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("cadence")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/cadence/` (~/.local/state/cadence/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("cadence")
    }

    /// Returns the checkpoint database file path
    ///
    /// `$XDG_DATA_HOME/cadence/metrics.db` (~/.local/share/cadence/metrics.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("metrics.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/cadence/cadence.log` (~/.local/state/cadence/cadence.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("cadence.log")
    }
}
