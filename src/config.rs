//! Application configuration
//! Optional JSON file with the savings goal, timeframe, label and export defaults.

use crate::stats::{DEFAULT_ANOMALY_THRESHOLD, DEFAULT_FORECAST_MONTHS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SAVINGS_TRACKER_CONFIG";
/// Looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "savings_tracker.json";

const MAX_FORECAST_MONTHS: usize = 36;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub savings_goal: f64,
    /// Months to reach the goal in; enables the monthly target.
    pub goal_timeframe_months: Option<u32>,
    pub month_label_prefix: String,
    pub forecast_months: usize,
    pub anomaly_threshold: f64,
    pub export_width: u32,
    pub export_height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            savings_goal: 1000.0,
            goal_timeframe_months: None,
            month_label_prefix: "Month".to_string(),
            forecast_months: DEFAULT_FORECAST_MONTHS,
            anomaly_threshold: DEFAULT_ANOMALY_THRESHOLD,
            export_width: 1200,
            export_height: 700,
        }
    }
}

impl AppConfig {
    /// Load from `SAVINGS_TRACKER_CONFIG`, then `savings_tracker.json`, else defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_path(Path::new(&path)),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_path(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.savings_goal.is_finite() || self.savings_goal < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "savings_goal must be a non-negative number, got {}",
                self.savings_goal
            )));
        }
        if self.goal_timeframe_months == Some(0) {
            return Err(ConfigError::Invalid(
                "goal_timeframe_months must be at least 1".to_string(),
            ));
        }
        if !self.anomaly_threshold.is_finite() || self.anomaly_threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "anomaly_threshold must be a positive number, got {}",
                self.anomaly_threshold
            )));
        }
        if self.export_width == 0 || self.export_height == 0 {
            return Err(ConfigError::Invalid(
                "export_width and export_height must be greater than zero".to_string(),
            ));
        }
        if self.forecast_months > MAX_FORECAST_MONTHS {
            return Err(ConfigError::Invalid(format!(
                "forecast_months must be at most {}",
                MAX_FORECAST_MONTHS
            )));
        }
        Ok(())
    }

    pub fn export_size(&self) -> (u32, u32) {
        (self.export_width, self.export_height)
    }
}
