use async_trait::async_trait;

use super::fallback::fallback_reply;
use super::models::{ChatMessage, MessageRole};
use crate::core::{ApiError, AppConfig, ChatCompletionOptions, ErrorCode, Mode};
use crate::openai::{ApiClient, Message, Role};

pub const EMPTY_HISTORY: &str = "没有可发送的消息";
pub const AUTH_FAILED: &str = "API 认证失败，请检查 API Key";
pub const ENDPOINT_MISSING: &str = "API 端点不存在，请检查 API 配置";
pub const RATE_LIMITED: &str = "请求过于频繁，请稍后再试";
pub const SERVER_ERROR: &str = "服务器错误，请稍后重试";
pub const TIMED_OUT: &str = "请求超时，请稍后重试";
pub const CHECK_CONFIG: &str = "请检查API配置和网络连接";
pub const UNKNOWN: &str = "发生未知错误";
pub const APOLOGY: &str = "抱歉，";

/// Produces the assistant's reply text for a transcript.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, history: &[ChatMessage]) -> Result<String, ApiError>;
}

/// Sends the full transcript to the completion endpoint.
pub struct LiveResponder {
    client: ApiClient,
    options: ChatCompletionOptions,
}

impl LiveResponder {
    pub fn new(client: ApiClient, options: ChatCompletionOptions) -> Self {
        Self { client, options }
    }
}

#[async_trait]
impl Responder for LiveResponder {
    async fn respond(&self, history: &[ChatMessage]) -> Result<String, ApiError> {
        let messages: Vec<Message> = history.iter().map(to_wire).collect();
        let resp = self.client.completion(&messages, &self.options).await?;
        resp.content()
    }
}

/// Answers from canned templates keyed on the last turn of the history.
pub struct FallbackResponder;

#[async_trait]
impl Responder for FallbackResponder {
    async fn respond(&self, history: &[ChatMessage]) -> Result<String, ApiError> {
        let latest = history.last().map(|m| m.content.as_str()).unwrap_or_default();
        Ok(fallback_reply(latest, &mut rand::rng()))
    }
}

/// Turns a transcript into the next assistant turn. Never fails: any
/// transport or response problem becomes an apologetic assistant
/// message so there is always something to show.
pub struct ChatService {
    responder: Box<dyn Responder>,
}

impl ChatService {
    pub fn new(responder: impl Responder + 'static) -> Self {
        Self {
            responder: Box::new(responder),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let service = match &config.mode {
            Mode::Live(api) => {
                let client = ApiClient::new(api)?;
                Self::new(LiveResponder::new(client, config.options.clone()))
            }
            Mode::Fallback => {
                tracing::warn!("No API key configured, using canned replies");
                Self::new(FallbackResponder)
            }
        };
        Ok(service)
    }

    pub async fn send_message(&self, history: &[ChatMessage]) -> ChatMessage {
        if history.is_empty() {
            return ChatMessage::assistant(&format!("{}{}", APOLOGY, EMPTY_HISTORY));
        }

        match self.responder.respond(history).await {
            Ok(content) => ChatMessage::assistant(&content),
            Err(err) => {
                tracing::error!(
                    code = %err.code,
                    status = ?err.status,
                    "API call failed: {}",
                    err.message
                );
                ChatMessage::assistant(&format!("{}{}", APOLOGY, describe_error(&err)))
            }
        }
    }
}

/// User facing explanation of a failed call.
pub fn describe_error(err: &ApiError) -> String {
    match (err.code, err.status) {
        (_, Some(401)) => AUTH_FAILED.to_string(),
        (_, Some(404)) => ENDPOINT_MISSING.to_string(),
        (_, Some(429)) => RATE_LIMITED.to_string(),
        (_, Some(500)) => SERVER_ERROR.to_string(),
        (_, Some(status)) => {
            let detail = if err.message.trim().is_empty() {
                CHECK_CONFIG
            } else {
                err.message.as_str()
            };
            format!("API 错误 ({}): {}", status, detail)
        }
        (ErrorCode::Timeout, None) => TIMED_OUT.to_string(),
        _ if err.message.trim().is_empty() => UNKNOWN.to_string(),
        _ => err.message.clone(),
    }
}

fn to_wire(msg: &ChatMessage) -> Message {
    let role = match msg.role {
        MessageRole::User => Role::User,
        MessageRole::Assistant => Role::Assistant,
        MessageRole::System => Role::System,
    };
    Message::new(role, &msg.content)
}
