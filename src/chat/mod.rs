pub mod conversation;
pub mod fallback;
pub mod models;
pub mod service;

pub use conversation::Conversation;
pub use models::{ChatMessage, ChatSession, MessageRole};
pub use service::{ChatService, FallbackResponder, LiveResponder, Responder, describe_error};
