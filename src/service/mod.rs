pub mod openai;
pub mod types;

use anyhow::Result;

pub use types::{ChatMessage, ChatRequest, ContentPart, ImageUrl, MessageContent};

/// One chat-completion round trip against a text-understanding service.
pub trait ChatService {
    /// Returns the content of the first choice's message, untrimmed.
    fn complete(&self, req: &ChatRequest) -> Result<String>;
}
