//! Configuration for quizsmith.
//!
//! Everything is resolved once at process start from the environment (with an
//! optional `.env` file) into plain structs; the extraction client receives
//! its section by reference, so no credential lives in ambient global state.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::session::ConversationId;

/// Main configuration for the bot.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub extraction: ExtractionConfig,
    /// Optional chat that receives a notice when the bot comes online.
    pub admin_chat_id: Option<ConversationId>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            telegram: TelegramConfig::from_env()?,
            extraction: ExtractionConfig::from_env()?,
            admin_chat_id: optional_env("ADMIN_CHAT_ID")?
                .map(|s| {
                    s.parse().map_err(|e| ConfigError::InvalidValue {
                        key: "ADMIN_CHAT_ID".to_string(),
                        message: format!("must be a chat id: {e}"),
                    })
                })
                .transpose()?,
        })
    }
}

/// Telegram bot credential.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
}

impl TelegramConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bot_token: SecretString::from(required_env("BOT_TOKEN")?),
        })
    }
}

/// Extraction service endpoint and credential.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Service API key.
    pub api_key: SecretString,
    /// Base URL of the service (overridable for tests and proxies).
    pub base_url: String,
    /// Model the analyze step requests.
    pub model: String,
    /// Caller-visible timeout applied to each remote step.
    pub request_timeout: Duration,
}

impl ExtractionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = optional_env("EXTRACTION_TIMEOUT_SECS")?
            .map(|s| {
                s.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                    key: "EXTRACTION_TIMEOUT_SECS".to_string(),
                    message: format!("must be a number of seconds: {e}"),
                })
            })
            .transpose()?
            .unwrap_or(120);

        Ok(Self {
            api_key: SecretString::from(required_env("OPENAI_API_KEY")?),
            base_url: optional_env("EXTRACTION_BASE_URL")?
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
            model: optional_env("EXTRACTION_MODEL")?
                .unwrap_or_else(|| "gpt-4-turbo".to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn required_env(key: &str) -> Result<String, ConfigError> {
    optional_env(key)?.ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}
