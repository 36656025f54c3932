//! Configuration loading, validation, and task files for ACE.
//!
//! Loads configuration from `~/.ace/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use ace_core::task::{Task, TaskContext};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.ace/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Max tokens per LLM response (unset = let the server decide)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,

    /// HTTP request timeout for gateway calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Playbook loop settings
    #[serde(default, rename = "loop")]
    pub loop_config: LoopConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "lmstudio".into()
}
fn default_model() -> String {
    "local-model".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_request_timeout_secs() -> u64 {
    120
}

/// Redact a secret string for Debug output.
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
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("loop_config", &self.loop_config)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Settings for the generator → reflector → curator loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Number of iterations per run
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Print the playbook and every role output while running
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

fn default_iterations() -> usize {
    5
}
fn default_true() -> bool {
    true
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            show_progress: true,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.ace/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `ACE_API_KEY` (highest priority)
    /// - `OPENAI_API_KEY`
    /// - `OPENROUTER_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("ACE_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .or_else(|| std::env::var("OPENROUTER_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("ACE_PROVIDER") {
            config.default_provider = provider;
        }

        if let Ok(model) = std::env::var("ACE_MODEL") {
            config.default_model = model;
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

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ace")
    }

    /// Path of the main config file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Path of the task file used when `--task` is not given.
    pub fn default_task_path() -> PathBuf {
        Self::config_dir().join("task.toml")
    }

    /// The model configured for the default provider, if it overrides
    /// `default_model`.
    pub fn model(&self) -> &str {
        self.providers
            .get(&self.default_provider)
            .and_then(|p| p.default_model.as_deref())
            .unwrap_or(&self.default_model)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.loop_config.iterations == 0 {
            return Err(ConfigError::ValidationError(
                "loop.iterations must be at least 1".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: None,
            request_timeout_secs: default_request_timeout_secs(),
            loop_config: LoopConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// On-disk shape of a task file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskFile {
    pub system_prompt: String,
    pub user_prompt: String,
    pub ground_truth: String,
}

impl TaskFile {
    /// Load a task from a TOML file. Unlike the config, a missing task file is an error.
    pub fn load_from(path: &Path) -> Result<Task, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let file: TaskFile = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if file.user_prompt.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "user_prompt in {} is empty",
                path.display()
            )));
        }

        Ok(file.into())
    }

    /// The sample task written by `onboard`.
    pub fn sample() -> Self {
        Self {
            system_prompt: "You are a helpful assistant that solves problems".into(),
            user_prompt: concat!(
                "Context: the house has 10 doors on the basement floor. it has 6 doors on the upper floor.\n",
                "there are two bedrooms downstairs and two upstairs.\n",
                "there are two bathrooms downstairs and two upstairs.\n",
                "there is a stair connecting the basement and upper floor.\n",
                "the master room is on the basement floor. the door from the basement floor opens up the living room.\n",
                "the stair is in the living room.\n",
                "there's another door by the kitchen that leads to the living room.\n",
                "the main door of the house leads to the living room.\n",
                "there is a bedroom in a corner and to the right of the other bedroom upstairs.\n",
                "the stairs leads up to a upper living room.\n",
                "the stairs is near the ac control box.\n",
                "one of the bedrooms is near the ac control box.\n",
                "the ac control box is in the center of the upstairs.\n\n",
                "Query: tell me the path to my personal bedroom in a linkedlist format starting from the ",
                "master bedroom where each node is connects to another with an arrow.",
            )
            .into(),
            ground_truth: concat!(
                "Master Bedroom -> Master Bedroom Door -> Living Room -> Stairs -> Upper Living Room -> ",
                "AC Control Box -> Bedroom Near AC Control Box -> Bedroom to the Right, in the Corner",
            )
            .into(),
        }
    }

    pub fn sample_toml() -> String {
        toml::to_string_pretty(&Self::sample()).unwrap_or_default()
    }
}

impl From<TaskFile> for Task {
    fn from(file: TaskFile) -> Self {
        Task::new(
            TaskContext::new(file.system_prompt, file.user_prompt),
            file.ground_truth,
        )
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for ace_core::Error {
    fn from(err: ConfigError) -> Self {
        ace_core::Error::Config {
            message: err.to_string(),
        }
    }
}
