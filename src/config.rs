//! Configuration module for roomrelay.

use serde::Deserialize;
use std::path::Path;

use crate::{RelayError, Result};

/// Telegram bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token issued by BotFather.
    #[serde(default)]
    pub token: String,
    /// User IDs allowed to use the admin panel.
    #[serde(default)]
    pub admin_ids: Vec<i64>,
    /// Long-polling timeout passed to getUpdates, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u32,
    /// HTTP client timeout in seconds. Must exceed the polling timeout.
    #[serde(default = "default_client_timeout")]
    pub client_timeout_secs: u64,
    /// Delay before retrying after a failed getUpdates call, in seconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

fn default_poll_timeout() -> u32 {
    30
}

fn default_client_timeout() -> u64 {
    45
}

fn default_retry_delay() -> u64 {
    5
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            admin_ids: vec![],
            poll_timeout_secs: default_poll_timeout(),
            client_timeout_secs: default_client_timeout(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/roomrelay.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/roomrelay.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Telegram configuration.
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(RelayError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RelayError::Validation(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `ROOMRELAY_BOT_TOKEN`: Override the bot token
    /// - `ROOMRELAY_ADMIN_IDS`: Comma-separated admin user IDs
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(token) = std::env::var("ROOMRELAY_BOT_TOKEN") {
            if !token.is_empty() {
                self.telegram.token = token;
            }
        }
        if let Ok(ids) = std::env::var("ROOMRELAY_ADMIN_IDS") {
            if !ids.trim().is_empty() {
                self.telegram.admin_ids = parse_admin_ids(&ids)?;
            }
        }
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the bot token is not set.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.token.trim().is_empty() {
            return Err(RelayError::Config(
                "telegram token is not set. \
                 Set it in config.toml or via ROOMRELAY_BOT_TOKEN environment variable."
                    .to_string(),
            ));
        }
        if self.telegram.admin_ids.is_empty() {
            tracing::warn!("no admin ids configured; rooms cannot be created");
        }
        Ok(())
    }
}

/// Parse a comma-separated list of user IDs.
pub fn parse_admin_ids(s: &str) -> Result<Vec<i64>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| RelayError::Validation(format!("invalid admin id: {part}")))
        })
        .collect()
}
