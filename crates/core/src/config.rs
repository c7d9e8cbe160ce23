//! Configuration management for the banter CLI.
//!
//! Configuration is merged from multiple sources, later sources taking
//! precedence:
//! 1. Built-in defaults
//! 2. YAML config file (`$BANTER_CONFIG` or `~/.config/banter/config.yaml`)
//! 3. Environment variables
//! 4. Command-line flags (applied via [`AppConfig::with_overrides`])

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default system prompt opening every conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Provide concise replies.";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Short name of the model used when none is selected explicitly
    pub default_model: String,

    /// System prompt placed at the head of every conversation
    pub system_prompt: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// On-disk configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(rename = "defaultModel")]
    default_model: Option<String>,
    #[serde(rename = "systemPrompt")]
    system_prompt: Option<String>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_model: "llama3".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `BANTER_CONFIG`: path to the config file
    /// - `BANTER_MODEL`: default model short name
    /// - `BANTER_SYSTEM_PROMPT`: system prompt override
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::config_path() {
            if path.exists() {
                config.merge_yaml(&path)?;
            }
        }

        // Environment variables override the config file
        if let Ok(model) = std::env::var("BANTER_MODEL") {
            config.default_model = model;
        }

        if let Ok(prompt) = std::env::var("BANTER_SYSTEM_PROMPT") {
            config.system_prompt = prompt;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Locate the config file: `$BANTER_CONFIG` wins, otherwise
    /// `~/.config/banter/config.yaml`.
    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("BANTER_CONFIG") {
            return Some(PathBuf::from(path));
        }

        dirs::config_dir().map(|dir| dir.join("banter").join("config.yaml"))
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(model) = file.default_model {
            self.default_model = model;
        }

        if let Some(prompt) = file.system_prompt {
            self.system_prompt = prompt;
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        Ok(())
    }

    /// Apply CLI overrides, giving flags precedence over everything loaded
    /// so far.
    pub fn with_overrides(
        mut self,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(model) = model {
            self.default_model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }
}
