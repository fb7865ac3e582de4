use anyhow::{Result, anyhow};
use chrono::Local;

use crate::chat::MessageRole;
use crate::storage::SessionStore;

pub fn list(store: &SessionStore) -> Result<()> {
    let sessions = store.list_sessions()?;
    if sessions.is_empty() {
        println!("No saved sessions");
        return Ok(());
    }
    for session in sessions {
        println!(
            "{}  {}  {:>3} msgs  {}",
            session.id,
            session.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            session.messages.len(),
            session.title()
        );
    }
    Ok(())
}

pub fn show(store: &SessionStore, id: &str) -> Result<()> {
    let session = store
        .get_session(id)?
        .ok_or_else(|| anyhow!("Chat session {} not found", id))?;
    for msg in session.messages {
        let who = match msg.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        };
        println!("[{}] {}:\n{}\n", msg.timestamp, who, msg.content);
    }
    Ok(())
}

pub fn delete(store: &SessionStore, id: &str) -> Result<()> {
    store.delete_session(id)?;
    println!("Deleted session {}", id);
    Ok(())
}
