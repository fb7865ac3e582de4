mod core;

pub use self::core::{
    ApiClient, COMPLETIONS_PATH, ChoiceMessage, CompletionChoice, CompletionRequest,
    CompletionResponse, Message, Role,
};
