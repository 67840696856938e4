//! Configuration management for micmute.
//!
//! This module provides configuration that doesn't depend on the desktop
//! shell or on any particular status source.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::APP_NAME;

/// Errors found when validating a loaded configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("polling interval must be greater than zero")]
    ZeroInterval,

    #[error("query timeout must be greater than zero")]
    ZeroTimeout,

    #[error("status command must name a program")]
    EmptyCommand,
}

/// Configuration structure for the application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Time between two status queries (in milliseconds)
    #[serde(
        default = "default_interval_ms",
        skip_serializing_if = "is_default_interval_ms"
    )]
    pub interval_ms: u64,

    /// Upper bound on a single status query (in milliseconds)
    #[serde(
        default = "default_query_timeout_ms",
        skip_serializing_if = "is_default_query_timeout_ms"
    )]
    pub query_timeout_ms: u64,

    /// Program and arguments that print the mute status of the default
    /// microphone. Falls back to a platform default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,

    /// Show a desktop notification whenever the mute state flips
    #[serde(default, skip_serializing_if = "is_false")]
    pub notify_on_change: bool,
}

fn default_interval_ms() -> u64 {
    2000
}

fn is_default_interval_ms(v: &u64) -> bool {
    *v == default_interval_ms()
}

fn default_query_timeout_ms() -> u64 {
    1500
}

fn is_default_query_timeout_ms(v: &u64) -> bool {
    *v == default_query_timeout_ms()
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            query_timeout_ms: default_query_timeout_ms(),
            command: None,
            notify_on_change: false,
        }
    }
}

impl Config {
    /// Get the query timeout as a Duration
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// The status command, or the platform default if none is configured.
    pub fn command(&self) -> Option<Vec<String>> {
        self.command.clone().or_else(default_command)
    }

    pub fn notify_on_change(&self) -> bool {
        self.notify_on_change
    }

    /// Check the values that cannot be expressed in the type.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.query_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if let Some(command) = &self.command {
            if command.first().is_none_or(|program| program.trim().is_empty()) {
                return Err(ConfigError::EmptyCommand);
            }
        }
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn default_command() -> Option<Vec<String>> {
    Some(
        ["pactl", "get-source-mute", "@DEFAULT_SOURCE@"]
            .into_iter()
            .map(String::from)
            .collect(),
    )
}

#[cfg(not(target_os = "linux"))]
fn default_command() -> Option<Vec<String>> {
    None
}

/// Tells the user where to set a status command when none resolves.
fn missing_command_hint(config_path: &Path, command: Option<&[String]>) -> Option<String> {
    if command.is_some() {
        return None;
    }
    Some(format!(
        "No mic status command is configured for this platform. \
         Set `command` in {} to a program that prints the mute state, \
         e.g. command = [\"mic-status\", \"--plain\"]",
        config_path.display()
    ))
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new ConfigManager with the default configuration directory.
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Creates a new ConfigManager with a specified configuration directory.
    pub fn with_config_dir<P: AsRef<std::path::Path>>(dir: P) -> Self {
        let config_path = dir.as_ref().join(format!("{}.toml", APP_NAME));
        Self { config_path }
    }

    /// Returns the default path to the configuration file.
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to retrieve configuration directory")?;
        Ok(config_dir.join(APP_NAME).join(format!("{}.toml", APP_NAME)))
    }

    /// Loads the configuration from the config file or returns default.
    pub fn load(&self) -> Result<Config> {
        let config = if self.config_path.exists() {
            self.read()?
        } else {
            Config::default()
        };

        if let Some(hint) = missing_command_hint(&self.config_path, config.command().as_deref()) {
            warn!("{}", hint);
        }

        Ok(config)
    }

    fn read(&self) -> Result<Config> {
        let config_content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file at {:?}", self.config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file at {:?}", self.config_path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file at {:?}", self.config_path))?;

        Ok(config)
    }

    /// Saves the configuration to the config file.
    pub fn save(&self, config: &Config) -> Result<()> {
        let config_dir = self
            .config_path
            .parent()
            .with_context(|| format!("Failed to get parent directory of {:?}", self.config_path))?;

        fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create config directory at {:?}", config_dir))?;

        let serialized =
            toml::to_string_pretty(&config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, serialized)
            .with_context(|| format!("Failed to write config file at {:?}", self.config_path))?;

        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path(&self) -> &std::path::Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.interval_ms, 2000);
        assert_eq!(config.query_timeout(), Duration::from_millis(1500));
        assert!(config.command.is_none());
        assert!(!config.notify_on_change());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_defaults_are_not_serialized() {
        let serialized = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(serialized.trim().is_empty(), "got {serialized:?}");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            interval_ms: 500,
            command: Some(vec!["mic-status".to_string(), "--plain".to_string()]),
            notify_on_change: true,
            ..Default::default()
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_configured_command_wins() {
        let config = Config {
            command: Some(vec!["echo".to_string(), "true".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            config.command(),
            Some(vec!["echo".to_string(), "true".to_string()])
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_interval = Config {
            interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(zero_interval.validate(), Err(ConfigError::ZeroInterval));

        let zero_timeout = Config {
            query_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(zero_timeout.validate(), Err(ConfigError::ZeroTimeout));

        let empty_command = Config {
            command: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(empty_command.validate(), Err(ConfigError::EmptyCommand));

        let blank_program = Config {
            command: Some(vec![" ".to_string()]),
            ..Default::default()
        };
        assert_eq!(blank_program.validate(), Err(ConfigError::EmptyCommand));
    }

    #[test]
    fn test_missing_command_hint_names_config_path() {
        let path = Path::new("/tmp/micmute/micmute.toml");

        let hint = missing_command_hint(path, None).unwrap();
        assert!(hint.contains("/tmp/micmute/micmute.toml"), "got {hint:?}");
        assert!(hint.contains("`command`"));
        assert!(!hint.contains("tray"));

        let command = vec!["pactl".to_string()];
        assert!(missing_command_hint(path, Some(command.as_slice())).is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_fresh_install_uses_platform_command() {
        let temp = tempdir().unwrap();
        let config = ConfigManager::with_config_dir(temp.path()).load().unwrap();
        assert_eq!(config.command().unwrap()[0], "pactl");
    }

    #[cfg(not(target_os = "linux"))]
    #[test]
    fn test_fresh_install_without_platform_command_still_loads() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_config_dir(temp.path());

        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert!(config.command().is_none());
        assert!(missing_command_hint(manager.config_path(), config.command().as_deref()).is_some());
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_config_dir(temp.path());
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn test_config_manager_save_load() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_config_dir(temp.path().join("nested"));

        let config = Config {
            interval_ms: 750,
            ..Default::default()
        };

        manager.save(&config).unwrap();
        assert!(manager.config_path().exists());

        let loaded = manager.load().unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_config_dir(temp.path());
        fs::write(manager.config_path(), "interval_ms = 0\n").unwrap();

        let err = manager.load().unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }
}
