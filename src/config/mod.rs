//! Persistent application configuration.
//!
//! Session preferences live in [`crate::domain::UserSettings`]; this module
//! only covers the values that survive restarts.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::persistence::replace_file;

const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const DATA_FILE: &str = "subscriptions.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),
}

/// Stores user-configurable defaults for the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    /// Seeds the session's preferred currency.
    pub currency: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default)]
    pub currency_precision: Option<u8>,
    /// Days ahead the dashboard looks for upcoming renewals.
    #[serde(default = "Config::default_upcoming_window_days")]
    pub upcoming_window_days: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional store file location. Defaults to `<base>/subscriptions.json`.
    pub data_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            currency_precision: None,
            upcoming_window_days: Self::default_upcoming_window_days(),
            data_file: None,
        }
    }
}

impl Config {
    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_upcoming_window_days() -> i64 {
        14
    }

    pub fn resolve_data_file(&self, base: &Path) -> PathBuf {
        match &self.data_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => base.join(path),
            None => base.join(DATA_FILE),
        }
    }
}

/// Loads and saves [`Config`] under `<base>/config/config.json`.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join(CONFIG_DIR);
        fs::create_dir_all(&config_dir)?;
        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE),
            base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Reads the config file, or returns defaults when none has been saved.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.config_path)?;
        serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        replace_file(&self.config_path, &json)?;
        Ok(())
    }
}
