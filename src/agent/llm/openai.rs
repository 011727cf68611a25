use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::LlmProvider;
use crate::agent::types::{Message, Tool};
use crate::error::{Error, Result};

const TOOL_CHOICE_AUTO: &str = "auto";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [Tool],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    stream: bool,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, messages: &'a [Message], tools: &'a [Tool]) -> Self {
        Self {
            model,
            messages,
            tools,
            tool_choice: (!tools.is_empty()).then_some(TOOL_CHOICE_AUTO),
            stream: false,
        }
    }
}

fn no_tools(tools: &&[Tool]) -> bool {
    tools.is_empty()
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

/// OpenAI-compatible LLM provider (DeepSeek by default)
pub struct OpenAIProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn call(&self, messages: &[Message], tools: &[Tool]) -> Result<Message> {
        trace!(
            "Request: {} messages, {} tools",
            messages.len(),
            tools.len()
        );

        let request = ChatRequest::new(&self.model, messages, tools);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Llm(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::Llm(e.to_string()))?;

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("malformed completion response: {}", e)))?;
        trace!("Response has {} choices", chat_response.choices.len());

        // First choice is the primary response
        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| Error::Llm("completion response has no choices".to_string()))
    }
}
