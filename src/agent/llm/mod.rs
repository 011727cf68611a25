pub mod openai;

use async_trait::async_trait;

use crate::agent::types::{Message, Tool};
use crate::error::Result;

/// Chat completion backend.
///
/// When `tools` is non-empty the model is free to answer directly or request
/// a tool call (tool choice "auto"). An empty slice means no tools are offered.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn call(&self, messages: &[Message], tools: &[Tool]) -> Result<Message>;
}
