//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{AppError, Result};

/// Keychain service name under which the language model API key is stored.
pub const KEYRING_SERVICE: &str = "bug-desk";

/// Chat endpoint limits.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ChatConfig {
    /// Longest accepted chat message, in characters.
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    /// Cap applied to the priority and active-issue queries.
    #[serde(default = "default_max_issues")]
    pub max_issues: u32,
    /// Number of issues listed in a plain-text reply.
    #[serde(default = "default_list_preview")]
    pub list_preview: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_chars: default_max_message_chars(),
            max_issues: default_max_issues(),
            list_preview: default_list_preview(),
        }
    }
}

fn default_max_message_chars() -> usize {
    500
}

fn default_max_issues() -> u32 {
    10
}

fn default_list_preview() -> usize {
    5
}

/// Language model settings for an OpenAI-compatible chat completion API.
///
/// The API key is loaded at runtime via OS keychain or environment
/// variable, never from the TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    /// Whether the language model may be used at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URL of the completion API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Model identifier sent with each request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Upper bound on generated tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// API key (populated at runtime).
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            api_base: default_api_base(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
            api_key: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-3.5-turbo".into()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_http_host() -> String {
    "127.0.0.1".into()
}

fn default_http_port() -> u16 {
    5000
}

fn default_db_path() -> PathBuf {
    PathBuf::from("bug_tracker.db")
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Interface the HTTP server binds to.
    #[serde(default = "default_http_host")]
    pub http_host: String,
    /// HTTP port; 0 lets the OS choose.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// `SQLite` database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Insert sample users and issues into an empty database on startup.
    #[serde(default = "default_true")]
    pub seed_sample_data: bool,
    /// Chat endpoint limits.
    #[serde(default)]
    pub chat: ChatConfig,
    /// Language model settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            http_host: default_http_host(),
            http_port: default_http_port(),
            db_path: default_db_path(),
            seed_sample_data: true,
            chat: ChatConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides (`DATABASE_PATH`).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var("DATABASE_PATH") {
            if !path.is_empty() {
                info!(%path, "database path overridden from environment");
                self.db_path = PathBuf::from(path);
            }
        }
    }

    /// Load the language model API key from OS keychain with env-var fallback.
    ///
    /// A missing key is not an error: the chat endpoint then answers
    /// with plain formatted text.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the keychain lookup task panics.
    pub async fn load_credentials(&mut self) -> Result<()> {
        if !self.llm.enabled {
            info!("language model disabled by configuration");
            return Ok(());
        }
        self.llm.api_key = load_credential("openai_api_key", "OPENAI_API_KEY").await?;
        if self.llm.api_key.is_none() {
            warn!("language model API key not found; chat replies use plain formatting");
        }
        Ok(())
    }

    /// Socket address string the HTTP server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    fn validate(&self) -> Result<()> {
        if self.chat.max_message_chars == 0 {
            return Err(AppError::Config(
                "chat.max_message_chars must be greater than zero".into(),
            ));
        }

        if self.chat.max_issues == 0 {
            return Err(AppError::Config(
                "chat.max_issues must be greater than zero".into(),
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(AppError::Config(
                "llm.max_tokens must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<Option<String>> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(Some(value)),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            info!(key = keyring_key, ?err, "keychain lookup failed, trying env var");
        }
    }

    Ok(env::var(env_key).ok().filter(|value| !value.is_empty()))
}
