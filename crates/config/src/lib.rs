//! Configuration loading, validation, and management for DeskPilot.
//!
//! Loads configuration from `~/.deskpilot/config.toml` with environment
//! variable overrides. Supplies the credentials the gateway and the
//! search-capable tools require before they may be constructed, and backs
//! the reset-preferences tool (delete the file, re-prompt on next start).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.deskpilot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model API key (Gemini)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Search API key (Tavily), used by internet_search / web_scrape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_api_key: Option<String>,

    /// The user's display name, woven into the system directive
    #[serde(default = "default_user_name")]
    pub user_name: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per model response (0 = provider default)
    #[serde(default)]
    pub default_max_tokens: u32,

    /// Maximum tool iterations per round (0 = unbounded, as the
    /// conversational loop traditionally runs)
    #[serde(default)]
    pub max_iterations: u32,
}

fn default_user_name() -> String {
    "there".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_temperature() -> f32 {
    0.0
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("search_api_key", &redact(&self.search_api_key))
            .field("user_name", &self.user_name)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.deskpilot/config.toml).
    ///
    /// Environment variables take priority over the file:
    /// - `DESKPILOT_API_KEY` / `GEMINI_API_KEY` — model key
    /// - `TAVILY_API_KEY` — search key
    /// - `DESKPILOT_MODEL` — default model
    /// - `DESKPILOT_NAME` — user display name
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;

        if let Ok(key) = std::env::var("DESKPILOT_API_KEY") {
            config.api_key = Some(key);
        } else if config.api_key.is_none() {
            config.api_key = std::env::var("GEMINI_API_KEY").ok();
        }

        if let Ok(key) = std::env::var("TAVILY_API_KEY") {
            config.search_api_key = Some(key);
        }

        if let Ok(model) = std::env::var("DESKPILOT_MODEL") {
            config.default_model = model;
        }

        if let Ok(name) = std::env::var("DESKPILOT_NAME") {
            config.user_name = name;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Persist this configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Persist this configuration to a specific file path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Remove the stored model API key and persist.
    ///
    /// The remedial action after the gateway reports an invalid credential:
    /// the next startup finds no key and re-prompts.
    pub fn clear_api_key(&mut self) -> Result<(), ConfigError> {
        self.api_key = None;
        tracing::warn!("Stored model API key cleared after authentication failure");
        self.save()
    }

    /// Delete the config file entirely (reset-preferences tool).
    ///
    /// Returns true if a file existed and was removed.
    pub fn reset() -> Result<bool, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path).map_err(|e| ConfigError::WriteError {
            path,
            reason: e.to_string(),
        })?;
        Ok(true)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(".deskpilot")
    }

    /// Path of the config file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Directory safe-deleted files are moved into.
    pub fn trash_dir() -> PathBuf {
        Self::config_dir().join("trash")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }
        Ok(())
    }

    /// Check if a model API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Check if a search API key is available.
    pub fn has_search_api_key(&self) -> bool {
        self.search_api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            search_api_key: None,
            user_name: default_user_name(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: 0,
            max_iterations: 0,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to write config file at {path}: {reason}")]
    WriteError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
