//! Configuration management module
//!
//! Handles loading, validation, and management of application configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::session::dispatcher::SessionSettings;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Logging level
    pub log_level: String,

    /// File-based logging configuration
    pub log: LogConfig,

    /// Session engine tuning
    pub session: SessionConfig,

    /// Demo walkthrough configuration
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle timeout applied to sessions that don't set their own, in seconds
    pub default_timeout_secs: u64,

    /// Interval between idle-session sweeps in milliseconds
    pub sweep_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Channel the demo walkthrough posts into
    pub channel_id: u64,

    /// Number of pages in the demo pagination session
    pub pages: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Absolute or relative path to the rolling log file
    pub file_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log: LogConfig::default(),
            session: SessionConfig::default(),
            demo: DemoConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 60,
            sweep_interval_ms: 1000,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            channel_id: 1,
            pages: 3,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_path: "logs/interactor.log".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        // INTERACTOR_LOG_LEVEL - logging level
        if let Ok(log_level) = env::var("INTERACTOR_LOG_LEVEL") {
            self.log_level = log_level;
        }

        // INTERACTOR_LOG_FILE_PATH - logging destination file
        if let Ok(file_path) = env::var("INTERACTOR_LOG_FILE_PATH") {
            if !file_path.trim().is_empty() {
                self.log.file_path = file_path;
            }
        }

        // INTERACTOR_SESSION_TIMEOUT_SECS - default idle timeout
        if let Ok(timeout) = env::var("INTERACTOR_SESSION_TIMEOUT_SECS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.session.default_timeout_secs = value;
            }
        }

        // INTERACTOR_SWEEP_INTERVAL_MS - idle sweep interval
        if let Ok(interval) = env::var("INTERACTOR_SWEEP_INTERVAL_MS") {
            if let Ok(value) = interval.parse::<u64>() {
                self.session.sweep_interval_ms = value;
            }
        }

        // INTERACTOR_DEMO_CHANNEL_ID - demo channel
        if let Ok(channel) = env::var("INTERACTOR_DEMO_CHANNEL_ID") {
            if let Ok(value) = channel.parse::<u64>() {
                self.demo.channel_id = value;
            }
        }

        // INTERACTOR_DEMO_PAGES - demo page count
        if let Ok(pages) = env::var("INTERACTOR_DEMO_PAGES") {
            if let Ok(value) = pages.parse::<usize>() {
                self.demo.pages = value;
            }
        }
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load_from_file(path).unwrap_or_else(|err| {
            tracing::warn!("Failed to load config: {}, using defaults", err);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.session.default_timeout_secs == 0 {
            anyhow::bail!("session.default_timeout_secs must be greater than 0");
        }

        if self.session.sweep_interval_ms == 0 {
            anyhow::bail!("session.sweep_interval_ms must be greater than 0");
        }

        if self.log.file_path.trim().is_empty() {
            anyhow::bail!("Log file path must not be empty");
        }

        if self.demo.pages == 0 {
            anyhow::bail!("demo.pages must be greater than 0");
        }

        Ok(())
    }

    /// Session engine settings derived from this configuration
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            default_timeout: Duration::from_secs(self.session.default_timeout_secs),
            sweep_interval: Duration::from_millis(self.session.sweep_interval_ms),
        }
    }

    /// Display formatted configuration
    pub fn display(&self) -> Result<()> {
        println!("Current configuration:");
        println!("{:#?}", self);
        Ok(())
    }

    /// Display configuration summary
    pub fn display_summary(&self) -> Result<()> {
        println!("Configuration loaded successfully");
        Ok(())
    }

    /// Display configuration management help
    pub fn display_help() -> Result<()> {
        println!("Configuration management commands:");
        println!("  interactor config show    - Show current configuration");
        println!("  interactor config set <key> <value> - Set configuration value");
        println!("  interactor config reset   - Reset to default configuration");
        Ok(())
    }

    /// Handle configuration command
    pub fn handle_command(action: &Option<crate::cli::ConfigAction>) -> Result<()> {
        match action {
            Some(crate::cli::ConfigAction::Show) => {
                let config = Config::load_or_default("config.toml");
                config.display()?;
            }
            Some(crate::cli::ConfigAction::Set { key, value }) => {
                println!("Config set command: {} = {}", key, value);
                println!("Note: Config set functionality not yet implemented");
            }
            Some(crate::cli::ConfigAction::Reset) => {
                let default_config = Config::default();
                default_config.display()?;
            }
            None => {
                Config::display_help()?;
            }
        }
        Ok(())
    }
}
