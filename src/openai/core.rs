use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{ApiError, ApiSettings, ChatCompletionOptions};

pub const COMPLETIONS_PATH: &str = "/chat/completions";

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

/// One turn in the shape the completion endpoint expects.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

// Every field is optional so a reply with a surprising shape still
// parses and gets rejected by `content` instead of failing to decode.
#[derive(Deserialize, Debug, Default)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Deserialize, Debug, Default)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Trimmed content of the first choice. Missing or `""` content is
    /// invalid, whitespace only content is empty.
    pub fn content(&self) -> Result<String, ApiError> {
        let content = self
            .choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|c| !c.is_empty())
            .ok_or_else(ApiError::invalid_response)?
            .trim();
        if content.is_empty() {
            return Err(ApiError::empty_response());
        }
        Ok(content.to_string())
    }
}

/// Thin wrapper around `reqwest` that knows the base URL, injects the
/// bearer credential, and logs every exchange. Only a 200 counts as
/// success.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("mentor/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, body).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, body).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!(
            method = %method,
            url = %url,
            authorization = "(hidden)",
            "API request"
        );

        let response = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .inspect_err(|e| {
                tracing::error!(method = %method, url = %url, "API request failed: {}", e)
            })?;

        let status = response.status();
        let text = response.text().await?;

        if status != StatusCode::OK {
            let data: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
            tracing::error!(
                status = status.as_u16(),
                url = %url,
                body = %data,
                "API error response"
            );
            let detail = data["error"]["message"].as_str().unwrap_or_default();
            return Err(ApiError::with_status(detail, status.as_u16()));
        }

        tracing::debug!(status = status.as_u16(), url = %url, body = %text, "API response");

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Parsing API response failed for {}\nError: {}", text, e);
            ApiError::invalid_response()
        })
    }

    /// Sends the whole transcript for one non-streaming completion.
    pub async fn completion(
        &self,
        messages: &[Message],
        options: &ChatCompletionOptions,
    ) -> Result<CompletionResponse, ApiError> {
        let payload = CompletionRequest {
            model: &options.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stream: false,
        };
        tracing::info!(
            model = %options.model,
            messages = messages.len(),
            base_url = %self.base_url,
            "Sending chat completion request"
        );
        let resp: CompletionResponse = self.post(COMPLETIONS_PATH, &payload).await?;
        tracing::info!(
            choices = resp.choices.len(),
            finish_reason = resp
                .choices
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("none"),
            "Received chat completion response"
        );
        Ok(resp)
    }
}
