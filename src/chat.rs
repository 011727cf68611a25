use std::future::Future;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::agent::llm::LlmProvider;
use crate::agent::orchestrator::{Answer, AnswerMode, Orchestrator};
use crate::agent::tool::places::PlaceFinder;
use crate::agent::types::Message;
use crate::places::SearchResponse;

const EXIT_COMMANDS: [&str; 2] = ["quit", "exit"];

/// Interactive session: one orchestrated turn per user line
pub struct ConversationClient<L, F> {
    orchestrator: Orchestrator<L, F>,
    history: Vec<Message>,
}

impl<L: LlmProvider, F: PlaceFinder> ConversationClient<L, F> {
    pub fn new(orchestrator: Orchestrator<L, F>, system_prompt: &str) -> Self {
        Self {
            orchestrator,
            history: vec![Message::system(system_prompt)],
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Handle one user message and return the text to show.
    ///
    /// A failed turn is rolled back so the history stays a valid sequence.
    pub async fn turn(&mut self, input: &str) -> String {
        let turn_start = self.history.len();
        self.history.push(Message::user(input));

        match self.orchestrator.decide(&mut self.history).await {
            Ok(Answer::Text(text)) => {
                self.history.push(Message::assistant(text.as_str()));
                text
            }
            Ok(Answer::Structured(response)) => {
                let text = render_places(&response);
                self.history.push(Message::assistant(text.as_str()));
                text
            }
            Err(e) => {
                warn!("Turn failed: {}", e);
                self.history.truncate(turn_start);
                format!("An error occurred with the AI model: {}", e)
            }
        }
    }

    /// Read lines from stdin until `quit`, EOF or Ctrl+C
    pub async fn run(mut self) -> std::io::Result<()> {
        self.run_until(BufReader::new(tokio::io::stdin()), tokio::signal::ctrl_c())
            .await
    }

    /// Chat over `reader` until `quit`, EOF or `shutdown` resolves.
    ///
    /// `shutdown` also interrupts a turn in flight, which is then rolled back.
    async fn run_until<R, S>(&mut self, reader: R, shutdown: S) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        S: Future,
    {
        info!(
            "Starting chat session ({:?} answers)",
            self.orchestrator.mode()
        );
        println!("Welcome! Ask me to find a place. Type 'quit' to exit.");

        tokio::pin!(shutdown);
        let mut lines = reader.lines();
        loop {
            print!("\nYou: ");
            std::io::stdout().flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = &mut shutdown => {
                    println!("\nExiting...");
                    break;
                }
            };
            let Some(line) = line else {
                break;
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if EXIT_COMMANDS.contains(&input.to_lowercase().as_str()) {
                break;
            }

            println!("\nFinding places...");
            let turn_start = self.history.len();
            let answer = tokio::select! {
                answer = self.turn(input) => Some(answer),
                _ = &mut shutdown => None,
            };
            let Some(answer) = answer else {
                warn!("Turn interrupted");
                self.history.truncate(turn_start);
                println!("\nExiting...");
                break;
            };
            println!("\nAssistant:\n{}", answer);
            debug!("History has {} messages", self.history().len());
        }

        println!("Goodbye!");
        Ok(())
    }
}

/// Render a search result as Markdown, numbered with direction links
pub fn render_places(response: &SearchResponse) -> String {
    if !response.status.is_ok() || response.results.is_empty() {
        return response
            .detail
            .clone()
            .unwrap_or_else(|| "No results were found.".to_string());
    }

    let offset = response
        .pagination
        .as_ref()
        .map(|p| (p.current_page.saturating_sub(1)) * p.results_per_page)
        .unwrap_or(0);

    let mut output = String::from("Here are some places I found:\n\n");
    for (i, place) in response.results.iter().enumerate() {
        let rating = place
            .rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        output.push_str(&format!(
            "**{}. {}**\n- **Address:** {}\n- **Rating:** {} ⭐\n- **[View on Map]({})**\n\n",
            offset + i + 1,
            place.name,
            place.address,
            rating,
            place.maps_direction_url
        ));
    }

    if let Some(pagination) = &response.pagination {
        output.push_str(&format!(
            "_Page {} of {} ({} results)_\n",
            pagination.current_page, pagination.total_pages, pagination.total_results
        ));
    }

    output.trim_end().to_string()
}
