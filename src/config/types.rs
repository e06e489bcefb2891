//! Core configuration types and loading.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use super::defaults::{
    default_console_author, default_console_guild, default_lanes, default_log_filter,
};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Prefix, mention and lane settings.
    pub dispatch: DispatchConfig,
    /// Per-guild prefix overrides.
    #[serde(default)]
    pub prefix: PrefixConfig,
    /// Permission nodes (`[[permission]]` blocks).
    #[serde(default, rename = "permission")]
    pub permissions: Vec<PermissionBlock>,
    /// Initial blacklist contents.
    #[serde(default)]
    pub blacklist: BlacklistConfig,
    /// Log output settings for the console host.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Identity used by the console host for stdin messages.
    #[serde(default)]
    pub console: ConsoleConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Invocation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Prefix used in direct messages and in guilds without an override (e.g., "!").
    pub default_prefix: String,
    /// Also accept the bot's mention as an invocation prefix.
    #[serde(default)]
    pub allow_mention: bool,
    /// Mention strings that address the bot (e.g., "<@123>").
    #[serde(default)]
    pub bot_mentions: Vec<String>,
    /// Worker lanes used to evaluate candidates for one message.
    #[serde(default = "default_lanes")]
    pub lanes: usize,
}

impl DispatchConfig {
    /// Settings with the given prefix and every other field at its default.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            default_prefix: prefix.into(),
            allow_mention: false,
            bot_mentions: Vec::new(),
            lanes: default_lanes(),
        }
    }
}

/// Per-guild prefix table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrefixConfig {
    /// Guild id → prefix.
    #[serde(default)]
    pub guilds: HashMap<String, String>,
}

/// Permission node declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct PermissionBlock {
    /// Node name (e.g., "Moderator").
    pub name: String,
    /// Nodes implied by holding this one.
    #[serde(default)]
    pub implies: Vec<String>,
}

/// Initial blacklist.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlacklistConfig {
    /// Author ids whose messages are dropped.
    #[serde(default)]
    pub users: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

/// Console host identity.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Author id attached to every stdin message.
    #[serde(default = "default_console_author")]
    pub author: String,
    /// Guild id attached to guild messages.
    #[serde(default = "default_console_guild")]
    pub guild: String,
    /// Permission nodes held by the console author in the guild.
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            author: default_console_author(),
            guild: default_console_guild(),
            permissions: Vec::new(),
        }
    }
}
