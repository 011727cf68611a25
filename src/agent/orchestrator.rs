use tracing::{debug, info, trace, warn};

use super::llm::LlmProvider;
use super::tool::places::{FIND_PLACES_TOOL_NAME, FindPlacesArgs, PlaceFinder, find_places_tool};
use super::types::{Message, Tool, ToolCall};
use crate::error::Result;
use crate::places::SearchResponse;

/// Tool calls executed per model reply. Further calls in the same reply are
/// dropped from the history and never executed.
pub const MAX_TOOL_CALLS_HONORED: usize = 1;

/// How a tool result is turned into the final answer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AnswerMode {
    /// Feed the tool result back to the model for a natural-language reply
    #[default]
    Synthesized,
    /// Return the tool result as-is for the caller to render
    Structured,
}

/// Terminal outcome of one user turn
#[derive(Clone, Debug, PartialEq)]
pub enum Answer {
    Text(String),
    Structured(SearchResponse),
}

/// Two-phase tool-calling exchange around the `find_places_on_map` tool
pub struct Orchestrator<L, F> {
    llm: L,
    finder: F,
    tools: Vec<Tool>,
    mode: AnswerMode,
}

impl<L: LlmProvider, F: PlaceFinder> Orchestrator<L, F> {
    pub fn new(llm: L, finder: F, mode: AnswerMode) -> Self {
        Self {
            llm,
            finder,
            tools: vec![find_places_tool()],
            mode,
        }
    }

    pub fn mode(&self) -> AnswerMode {
        self.mode
    }

    /// Run one turn against `history`.
    ///
    /// When the model requests the tool, the assistant tool-call message and the
    /// tool result are appended to `history`. The final answer itself is not
    /// appended. LLM failures are returned; tool failures become an `ERROR`
    /// result and never abort the turn.
    pub async fn decide(&self, history: &mut Vec<Message>) -> Result<Answer> {
        trace!("Calling LLM with {} messages", history.len());
        let mut reply = self.llm.call(history, &self.tools).await?;

        let calls = reply.requested_tool_calls();
        if calls.is_empty() {
            debug!("LLM answered without a tool call");
            return Ok(Answer::Text(reply.content.unwrap_or_default()));
        }
        if calls.len() > MAX_TOOL_CALLS_HONORED {
            warn!(
                "LLM requested {} tool calls, only the first {} will run",
                calls.len(),
                MAX_TOOL_CALLS_HONORED
            );
        }

        let call = calls[0].clone();
        if let Some(calls) = reply.tool_calls.as_mut() {
            calls.truncate(MAX_TOOL_CALLS_HONORED);
        }

        let result = self.execute(&call).await;
        let content = serde_json::to_string(&result).unwrap_or_else(|e| {
            warn!("Failed to encode tool result: {}", e);
            String::from(r#"{"status":"ERROR","results":[]}"#)
        });
        history.push(reply);
        history.push(Message::tool_result(&call, content));

        if self.mode == AnswerMode::Structured {
            return Ok(Answer::Structured(result));
        }

        debug!("Asking LLM to summarize {} results", result.results.len());
        let summary = self.llm.call(history, &[]).await?;
        Ok(Answer::Text(summary.content.unwrap_or_default()))
    }

    async fn execute(&self, call: &ToolCall) -> SearchResponse {
        if call.function.name != FIND_PLACES_TOOL_NAME {
            warn!("LLM requested unknown tool '{}'", call.function.name);
            return SearchResponse::error(format!("Unknown tool: {}", call.function.name));
        }

        let args = match FindPlacesArgs::parse(&call.function.arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!("Rejected tool arguments {:?}: {}", call.function.arguments, e);
                return SearchResponse::error(e.to_string());
            }
        };

        info!("Searching for: '{}'", args.query);
        match self.finder.find_places(&args.query).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Place search failed: {}", e);
                SearchResponse::error(e.to_string())
            }
        }
    }
}
