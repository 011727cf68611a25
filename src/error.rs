use thiserror::Error as ThisError;

/// Errors raised while searching places or talking to the LLM
#[derive(Debug, ThisError)]
pub enum Error {
    /// Missing credential, unreadable prompt file or invalid config file
    #[error("config error: {0}")]
    Config(String),
    /// Transport failure talking to the places provider or the search backend
    #[error("places provider error: {0}")]
    Provider(String),
    /// The places provider answered with a non-OK status
    #[error("places provider returned {status}: {message}")]
    ProviderStatus { status: String, message: String },
    /// Chat completion request failed or returned an unusable reply
    #[error("LLM error: {0}")]
    Llm(String),
    /// Invalid `top_n` or `page`
    #[error("{0}")]
    BadRequest(String),
    /// Requested page is past the end of the results
    #[error("{0}")]
    NotFound(String),
    /// Tool arguments emitted by the LLM could not be used
    #[error("invalid tool arguments: {0}")]
    ToolArguments(String),
}

pub type Result<T> = std::result::Result<T, Error>;
