use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use super::kv::KvStore;
use crate::chat::ChatSession;

pub const SESSION_KEY_PREFIX: &str = "chat_session_";

pub fn session_key(id: &str) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, id)
}

/// Persists chat sessions, one JSON record per session. Writers are not
/// coordinated, the last update for an id wins.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// A fresh empty session. Nothing is written until `update_session`.
    pub fn create_session(&self) -> ChatSession {
        ChatSession::new()
    }

    pub fn update_session(&self, session: &mut ChatSession) -> Result<()> {
        session.updated_at = Utc::now();
        let result = serde_json::to_string(session)
            .context("Failed to serialize session")
            .and_then(|data| self.kv.set(&session_key(&session.id), &data));
        if let Err(e) = &result {
            tracing::error!("Failed to update session {}: {:#}", session.id, e);
        }
        result
    }

    pub fn get_session(&self, id: &str) -> Result<Option<ChatSession>> {
        match self.kv.get(&session_key(id))? {
            Some(data) => {
                let session = serde_json::from_str(&data)
                    .with_context(|| format!("Corrupted session record {}", id))?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    /// All sessions, most recently updated first.
    pub fn list_sessions(&self) -> Result<Vec<ChatSession>> {
        let mut sessions = Vec::new();
        for key in self.kv.keys_with_prefix(SESSION_KEY_PREFIX)? {
            // A key can vanish between the scan and the read
            if let Some(data) = self.kv.get(&key)? {
                let session: ChatSession = serde_json::from_str(&data)
                    .with_context(|| format!("Corrupted session record {}", key))?;
                sessions.push(session);
            }
        }
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    pub fn delete_session(&self, id: &str) -> Result<()> {
        self.kv.delete(&session_key(id)).inspect_err(|e| {
            tracing::error!("Failed to delete session {}: {:#}", id, e);
        })
    }
}
