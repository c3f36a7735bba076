//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.taskpulse.toml` files.

use crate::analysis::{AggregatorOptions, DEFAULT_RECENT_WINDOW_DAYS};
use crate::chat::DEFAULT_CONTEXT_TODOS;
use crate::models::User;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".taskpulse.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// The acting user.
    #[serde(default)]
    pub user: UserConfig,

    /// Store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Assistant settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Analytics settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Identity of the acting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Email; todos are owned by it.
    #[serde(default = "default_email")]
    pub email: String,

    /// Display name used in greetings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            email: default_email(),
            name: None,
        }
    }
}

fn default_email() -> String {
    "me@localhost".to_string()
}

/// Store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON store file.
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "taskpulse.json".to_string()
}

/// Assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Number of recent todos the assistant sees.
    #[serde(default = "default_context_todos")]
    pub context_todos: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            context_todos: default_context_todos(),
        }
    }
}

fn default_context_todos() -> usize {
    DEFAULT_CONTEXT_TODOS
}

/// Analytics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Length of the "recent" window in days.
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            recent_window_days: default_recent_window_days(),
        }
    }
}

fn default_recent_window_days() -> u32 {
    DEFAULT_RECENT_WINDOW_DAYS
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref store) = args.store {
            self.store.path = store.display().to_string();
        }
        if let Some(ref email) = args.user {
            self.user.email = email.clone();
        }
        if let Some(ref name) = args.name {
            self.user.name = Some(name.clone());
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// The acting user.
    pub fn user(&self) -> User {
        User {
            name: self.user.name.clone().filter(|n| !n.trim().is_empty()),
            email: self.user.email.clone(),
        }
    }

    /// Path of the store file.
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.store.path)
    }

    /// Aggregator settings derived from `[analytics]`.
    pub fn aggregator_options(&self) -> AggregatorOptions {
        AggregatorOptions::with_window_days(self.analytics.recent_window_days)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.user.email, "me@localhost");
        assert_eq!(config.store.path, "taskpulse.json");
        assert_eq!(config.chat.context_todos, 10);
        assert_eq!(config.analytics.recent_window_days, 7);
        assert!(config.user().name.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[user]
email = "ada@example.com"
name = "Ada"

[store]
path = "data/todos.json"

[analytics]
recent_window_days = 14
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.user().name.as_deref(), Some("Ada"));
        assert_eq!(config.user().email, "ada@example.com");
        assert_eq!(config.store_path(), PathBuf::from("data/todos.json"));
        assert_eq!(config.analytics.recent_window_days, 14);
        // Missing section falls back to defaults.
        assert_eq!(config.chat.context_todos, 10);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let args = Args::try_parse_from([
            "taskpulse",
            "--store",
            "other.json",
            "--user",
            "bob@example.com",
            "--name",
            "Bob",
            "rules",
        ])
        .unwrap();

        config.merge_with_args(&args);

        assert_eq!(config.store.path, "other.json");
        assert_eq!(config.user().email, "bob@example.com");
        assert_eq!(config.user().name.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_blank_name_is_ignored() {
        let mut config = Config::default();
        config.user.name = Some("  ".to_string());
        assert!(config.user().name.is_none());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[user]"));
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[analytics]"));
    }
}
