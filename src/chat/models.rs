//! The core models for a chat session with an LLM.
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// One turn of a conversation. Never mutated after creation.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: &str) -> Self {
        Self {
            id: new_id(),
            role,
            content: content.to_string(),
            timestamp: display_timestamp(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: &str) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn system(content: &str) -> Self {
        Self::new(MessageRole::System, content)
    }
}

/// A persisted conversation transcript. `messages` is kept in
/// insertion order and is resent in full on every turn.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push(&mut self, msg: ChatMessage) {
        self.messages.push(msg)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Short label for listings, taken from the first user turn.
    pub fn title(&self) -> String {
        let first = self
            .messages
            .iter()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.trim())
            .unwrap_or("");
        if first.is_empty() {
            return String::from("(empty)");
        }
        let mut title: String = first.lines().next().unwrap_or(first).chars().take(40).collect();
        if first.chars().count() > title.chars().count() {
            title.push('…');
        }
        title
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Time ordered unique id (UUID v7).
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Wall clock time shown next to a message.
pub fn display_timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
