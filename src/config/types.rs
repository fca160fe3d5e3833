//! Configuration types, defaults, loading, and validation.

use super::secrets::SecretString;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Model provider and sampling settings for the judge
    #[serde(default)]
    pub judge: JudgeConfig,

    /// HTTP gateway configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the model invoker and prompt composer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Bearer credential for the completion API
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Full URL of the OpenAI-compatible chat completions endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature, kept low so verdicts are stable
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum characters accepted per request field
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_input_chars() -> usize {
    crate::brain::verdict::prompt::DEFAULT_MAX_INPUT_CHARS
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl JudgeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }
}

/// HTTP gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: "127.0.0.1")
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Listen port (default: 8787)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins. Empty means no cross-origin requests.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            allowed_origins: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write logs to this file
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Base directory for user-level configuration: `~/.whoiswrong`
pub fn whoiswrong_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".whoiswrong")
}

/// Deep-merge `overlay` into `base`: nested tables merge, other values replace.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config: ~/.whoiswrong/config.toml
    /// 3. Local config: ./whoiswrong.toml
    /// 4. Environment variables
    pub fn load() -> Result<Self> {
        tracing::debug!("Loading configuration...");

        let config = Self::load_layers(&[Self::system_config_path(), Self::local_config_path()])?;
        let config = config.apply_env_overrides(|key| std::env::var(key).ok())?;

        tracing::debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Merge the config files that exist, later files winning key by key.
    ///
    /// Keys a file omits keep the value from earlier files, then the default.
    pub fn load_layers(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = toml::Table::new();

        for path in paths.iter().filter(|p| p.exists()) {
            tracing::debug!("Loading config layer from: {:?}", path);
            merge_tables(&mut merged, Self::read_table(path)?);
        }

        toml::Value::Table(merged)
            .try_into()
            .context("Failed to apply merged configuration")
    }

    /// Load configuration from a specific file path, then apply environment overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }

        let config = Self::read_file(path)?;
        let config = config.apply_env_overrides(|key| std::env::var(key).ok())?;

        tracing::debug!("Configuration loaded successfully from custom path");
        Ok(config)
    }

    /// Get the system config path: ~/.whoiswrong/config.toml
    pub fn system_config_path() -> PathBuf {
        whoiswrong_home().join("config.toml")
    }

    /// Get the local config path: ./whoiswrong.toml
    fn local_config_path() -> PathBuf {
        PathBuf::from("./whoiswrong.toml")
    }

    /// Read a whole configuration from a TOML file.
    fn read_file(path: &Path) -> Result<Self> {
        toml::Value::Table(Self::read_table(path)?)
            .try_into()
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    fn read_table(path: &Path) -> Result<toml::Table> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// `WHOISWRONG_API_KEY` wins over `OPENAI_API_KEY`.
    pub fn apply_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("WHOISWRONG_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        if let Some(key) = api_key.as_deref().and_then(SecretString::from_input) {
            self.judge.api_key = Some(key);
        }

        if let Some(base_url) = lookup("WHOISWRONG_BASE_URL") {
            self.judge.base_url = base_url;
        }

        if let Some(model) = lookup("WHOISWRONG_MODEL") {
            self.judge.model = model;
        }

        if let Some(timeout) = lookup("WHOISWRONG_TIMEOUT_SECS") {
            self.judge.timeout_secs = timeout
                .parse()
                .with_context(|| format!("WHOISWRONG_TIMEOUT_SECS is not a number: {timeout}"))?;
        }

        if let Some(bind) = lookup("WHOISWRONG_BIND") {
            self.server.bind = bind;
        }

        if let Some(port) = lookup("WHOISWRONG_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("WHOISWRONG_PORT is not a valid port: {port}"))?;
        }

        if let Some(level) = lookup("WHOISWRONG_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(file) = lookup("WHOISWRONG_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }

        if let Some(json) = lookup("WHOISWRONG_LOG_JSON") {
            self.logging.json = json
                .parse()
                .with_context(|| format!("WHOISWRONG_LOG_JSON must be true or false: {json}"))?;
        }

        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        tracing::debug!("Validating configuration...");

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        let judge = &self.judge;
        if judge.model.trim().is_empty() {
            anyhow::bail!("judge.model must not be empty");
        }
        if judge.base_url.trim().is_empty() {
            anyhow::bail!("judge.base_url must not be empty");
        }
        if !(0.0..=2.0).contains(&judge.temperature) {
            anyhow::bail!(
                "judge.temperature must be between 0.0 and 2.0, got {}",
                judge.temperature
            );
        }
        if judge.max_tokens == 0 {
            anyhow::bail!("judge.max_tokens must be greater than zero");
        }
        if judge.timeout_secs == 0 {
            anyhow::bail!("judge.timeout_secs must be greater than zero");
        }
        if judge.max_input_chars == 0 {
            anyhow::bail!("judge.max_input_chars must be greater than zero");
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}
