pub mod client;
pub mod messages;

pub use client::ChatClient;
pub use messages::{
    ChatCompletionRequest, ChatCompletionResponse, ChatContent, ChatMessage, ContentPart,
    InputAudio,
};
