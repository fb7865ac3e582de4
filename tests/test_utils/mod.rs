//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use mentor::chat::{ChatService, LiveResponder};
use mentor::core::{ApiSettings, ChatCompletionOptions};
use mentor::openai::ApiClient;
use mentor::storage::{KvStore, SessionStore, SqliteStore};

pub const TEST_API_KEY: &str = "sk-test";

pub fn test_settings(base_url: &str, timeout: Duration) -> ApiSettings {
    ApiSettings {
        base_url: base_url.trim_end_matches('/').to_string(),
        api_key: TEST_API_KEY.to_string(),
        timeout,
    }
}

/// Chat service that talks to `base_url`, usually a mock server.
pub fn live_service(base_url: &str, timeout: Duration) -> ChatService {
    let client =
        ApiClient::new(&test_settings(base_url, timeout)).expect("Failed to build API client");
    ChatService::new(LiveResponder::new(client, ChatCompletionOptions::default()))
}

/// Session store backed by a database file in a fresh temporary
/// directory. Keep the directory alive for as long as the store.
pub fn sqlite_sessions() -> (TempDir, Arc<dyn KvStore>, SessionStore) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let kv: Arc<dyn KvStore> = Arc::new(
        SqliteStore::open(dir.path().join("mentor.db")).expect("Failed to open database"),
    );
    let sessions = SessionStore::new(Arc::clone(&kv));
    (dir, kv, sessions)
}

pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}
