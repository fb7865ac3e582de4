pub mod kv;
pub mod sessions;
pub mod sqlite;

pub use kv::{KvStore, MemoryStore};
pub use sessions::{SESSION_KEY_PREFIX, SessionStore, session_key};
pub use sqlite::SqliteStore;
