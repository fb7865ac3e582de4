pub mod config;
pub mod error;
pub mod logging;

pub use config::{ApiSettings, AppConfig, ChatCompletionOptions, Mode};
pub use error::{ApiError, ErrorCode};
