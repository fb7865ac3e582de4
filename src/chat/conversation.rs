use anyhow::Result;

use super::models::{ChatMessage, ChatSession};
use super::service::ChatService;
use crate::storage::SessionStore;

/// A working copy of one session bound to the service that answers it
/// and the store that persists it.
pub struct Conversation<'a> {
    service: &'a ChatService,
    store: &'a SessionStore,
    session: ChatSession,
}

impl<'a> Conversation<'a> {
    pub fn new(service: &'a ChatService, store: &'a SessionStore, session: ChatSession) -> Self {
        Self {
            service,
            store,
            session,
        }
    }

    /// Starts an unsaved session, seeded with a system turn if given.
    pub fn start(
        service: &'a ChatService,
        store: &'a SessionStore,
        system_message: Option<&str>,
    ) -> Self {
        let mut session = store.create_session();
        if let Some(system) = system_message {
            session.push(ChatMessage::system(system));
        }
        Self::new(service, store, session)
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Appends the user's turn, asks for the reply with the full
    /// transcript and appends that too. Call `save` to persist.
    pub async fn next_msg(&mut self, input: &str) -> ChatMessage {
        self.session.push(ChatMessage::user(input));
        let reply = self.service.send_message(&self.session.messages).await;
        self.session.push(reply.clone());
        reply
    }

    pub fn save(&mut self) -> Result<()> {
        self.store.update_session(&mut self.session)
    }
}
