use tracing::{debug, warn};

use super::llm::LlmProvider;
use super::types::Message;

/// Rewrites raw user queries into search-optimized ones
pub struct QueryPreprocessor<L> {
    llm: L,
    system_prompt: String,
}

impl<L: LlmProvider> QueryPreprocessor<L> {
    pub fn new(llm: L, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
        }
    }

    /// Rewrite `raw_query`, falling back to it unchanged on any failure
    pub async fn rewrite(&self, raw_query: &str) -> String {
        let messages = [
            Message::system(self.system_prompt.as_str()),
            Message::user(raw_query),
        ];

        match self.llm.call(&messages, &[]).await {
            Ok(reply) => match reply.content.as_deref().map(str::trim) {
                Some(processed) if !processed.is_empty() => {
                    debug!("Rewrote query '{}' -> '{}'", raw_query, processed);
                    processed.to_string()
                }
                _ => {
                    warn!("LLM returned an empty rewrite, using original query");
                    raw_query.to_string()
                }
            },
            Err(e) => {
                warn!("LLM preprocessing error, using original query: {}", e);
                raw_query.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::orchestrator::tests::ScriptedLlm;
    use crate::agent::types::Role;
    use crate::error::Error;

    #[tokio::test]
    async fn test_rewrite_trims_reply() {
        let llm = ScriptedLlm::new(vec![Ok(Message::assistant(
            "  pizza restaurants Brooklyn NY \n",
        ))]);
        let preprocessor = QueryPreprocessor::new(llm, "Rewrite queries for map search.");

        let processed = preprocessor.rewrite("where can I get pizza in brooklyn").await;

        assert_eq!(processed, "pizza restaurants Brooklyn NY");
        let requests = preprocessor.llm.requests.lock().unwrap();
        let (messages, tools) = &requests[0];
        assert_eq!(*tools, 0);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(
            messages[0].content.as_deref(),
            Some("Rewrite queries for map search.")
        );
        assert_eq!(
            messages[1].content.as_deref(),
            Some("where can I get pizza in brooklyn")
        );
    }

    #[tokio::test]
    async fn test_rewrite_falls_back_on_error() {
        let llm = ScriptedLlm::new(vec![Err(Error::Llm("timeout".into()))]);
        let preprocessor = QueryPreprocessor::new(llm, "prompt");
        assert_eq!(preprocessor.rewrite("coffee in Soho").await, "coffee in Soho");
    }

    #[tokio::test]
    async fn test_rewrite_falls_back_on_empty_reply() {
        let llm = ScriptedLlm::new(vec![Ok(Message::assistant("   "))]);
        let preprocessor = QueryPreprocessor::new(llm, "prompt");
        assert_eq!(preprocessor.rewrite("coffee in Soho").await, "coffee in Soho");
    }
}
