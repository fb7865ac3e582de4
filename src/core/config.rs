use std::env;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use super::error::{ApiError, ErrorCode};

pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const API_URL_MISSING_MESSAGE: &str =
    "API base URL not configured. Please set MENTOR_API_BASE_URL in your environment.";

/// Generation settings sent with every completion request. Read once
/// at startup and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatCompletionOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

impl Default for ChatCompletionOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        }
    }
}

/// Everything needed to talk to the completion endpoint.
#[derive(Clone, Debug)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub enum Mode {
    /// Replies come from the completion endpoint
    Live(ApiSettings),
    /// No credential in development mode, replies are canned
    Fallback,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub dev: bool,
    /// Seeded as the first turn of new sessions when set
    pub system_message: Option<String>,
    pub options: ChatCompletionOptions,
    pub mode: Mode,
}

impl AppConfig {
    /// Reads and validates configuration from the process environment.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as
    /// missing. Without an API key the config only resolves when
    /// development mode is on, in which case replies are canned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let dev = get("MENTOR_DEV")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let storage_path = get("MENTOR_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = PathBuf::from(&storage_path)
            .join("mentor.db")
            .display()
            .to_string();

        let system_message = get("MENTOR_SYSTEM_MESSAGE");

        let options = ChatCompletionOptions {
            model: get("MENTOR_CHAT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: get("MENTOR_TEMPERATURE")
                .and_then(|v| v.parse::<f32>().ok())
                .filter(|v| *v != 0.0 && v.is_finite())
                .unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: get("MENTOR_MAX_TOKENS")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|v| *v != 0)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            ..ChatCompletionOptions::default()
        };

        let api_key = get("MENTOR_API_KEY");
        let mode = match api_key {
            None if dev => Mode::Fallback,
            None => {
                return Err(ApiError::new(
                    "API key not configured. Please set MENTOR_API_KEY in your environment.",
                    ErrorCode::ApiKeyMissing,
                ));
            }
            Some(api_key) => {
                let base_url = get("MENTOR_API_BASE_URL").ok_or_else(|| {
                    ApiError::new(API_URL_MISSING_MESSAGE, ErrorCode::ApiUrlMissing)
                })?;
                validate_base_url(&base_url)?;
                Mode::Live(ApiSettings {
                    base_url: base_url.trim_end_matches('/').to_string(),
                    api_key,
                    timeout: REQUEST_TIMEOUT,
                })
            }
        };

        Ok(Self {
            storage_path,
            db_path,
            dev,
            system_message,
            options,
            mode,
        })
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.mode, Mode::Fallback)
    }
}

fn validate_base_url(base_url: &str) -> Result<(), ApiError> {
    let invalid = || {
        ApiError::new(
            "Invalid API base URL format. Please check MENTOR_API_BASE_URL.",
            ErrorCode::InvalidApiUrl,
        )
    };
    let url = Url::parse(base_url).map_err(|_| invalid())?;
    if url.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(())
}
