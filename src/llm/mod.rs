//! Hosted chat-completion models.

mod openai;

pub use openai::OpenAIChatModel;

use crate::error::Result;
use async_trait::async_trait;

/// A chat-completion service answering one system + user exchange.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Return the text of the first completion choice.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;
}
