use clap::{Args, Parser, Subcommand};

// Display order for API key options (placed at top of help text)
const API_KEY_DISPLAY_ORDER: usize = 0;
// Display order for log level option (placed at end of help text)
const LOG_LEVEL_DISPLAY_ORDER: usize = 100;

/// CLI arguments
#[derive(Parser)]
#[command(name = "placefinder", version, about = "Find real-world places through an LLM tool call", long_about = None)]
pub struct Cli {
    /// Log level (see https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
    /// [env: PLACEFINDER_LOG=] [default: info]
    #[arg(
        long,
        env = "PLACEFINDER_LOG",
        default_value = "info",
        global = true,
        hide_default_value = true,
        hide_env = true,
        display_order = LOG_LEVEL_DISPLAY_ORDER,
        verbatim_doc_comment
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a default placefinder.toml config file
    Init(InitArgs),
    /// Run the places search HTTP backend
    Serve(ServeArgs),
    /// Chat with the assistant in the terminal
    Chat(ChatArgs),
    /// Run a single search and print the JSON response
    Search(SearchArgs),
}

/// Arguments for the init command
#[derive(Parser)]
pub struct InitArgs {
    /// Path to config file
    #[arg(long, default_value = "placefinder.toml")]
    pub config: String,

    /// Override existing config file
    #[arg(long)]
    pub r#override: bool,
}

/// LLM connection settings shared by the commands that talk to the model
#[derive(Args, Debug, Clone)]
pub struct LlmArgs {
    /// LLM API key
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true, display_order = API_KEY_DISPLAY_ORDER)]
    pub api_key: String,

    #[command(flatten)]
    pub overrides: LlmOverrides,
}

/// Per-invocation overrides of the `[llm]` and `[prompt]` config sections
#[derive(Args, Debug, Clone, Default)]
pub struct LlmOverrides {
    /// OpenAI-compatible API base URL (overrides llm.base_url)
    #[arg(long, env = "LLM_BASE_URL")]
    pub base_url: Option<String>,

    /// Model name (overrides llm.model)
    #[arg(long, env = "LLM_MODEL")]
    pub model: Option<String>,

    /// System prompt file (overrides prompt.system_prompt)
    #[arg(long, env = "SYSTEM_PROMPT_FILE")]
    pub system_prompt: Option<String>,
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Path to config file (initialize with `placefinder init`)
    #[arg(long, default_value = "placefinder.toml")]
    pub config: String,

    /// Google Maps API key
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true, display_order = API_KEY_DISPLAY_ORDER)]
    pub maps_api_key: String,

    #[command(flatten)]
    pub llm: LlmArgs,

    /// Address to listen on (overrides server.addr)
    #[arg(long)]
    pub addr: Option<String>,

    /// Directory of static frontend files served for unmatched paths
    #[arg(long)]
    pub static_dir: Option<String>,
}

/// Arguments for the chat command
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Path to config file (initialize with `placefinder init`)
    #[arg(long, default_value = "placefinder.toml")]
    pub config: String,

    #[command(flatten)]
    pub llm: LlmArgs,

    /// Show search results as a formatted list instead of an LLM summary
    #[arg(long)]
    pub structured: bool,

    /// Base URL of a running `placefinder serve` (overrides server.backend_url)
    #[arg(long, conflicts_with = "local")]
    pub backend_url: Option<String>,

    /// Search in-process instead of calling the backend (requires a Google Maps API key)
    #[arg(long)]
    pub local: bool,

    /// Google Maps API key, used with --local
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true, display_order = API_KEY_DISPLAY_ORDER)]
    pub maps_api_key: Option<String>,
}

/// Arguments for the search command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Free-text query, e.g. "sushi restaurants near Times Square NYC"
    pub query: String,

    /// Path to config file (initialize with `placefinder init`)
    #[arg(long, default_value = "placefinder.toml")]
    pub config: String,

    /// Google Maps API key
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true, display_order = API_KEY_DISPLAY_ORDER)]
    pub maps_api_key: String,

    /// Results per page (1-60)
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    pub top_n: i64,

    /// Page number (starting at 1)
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub page: i64,

    /// Rewrite the query with the LLM before searching (requires DEEPSEEK_API_KEY)
    #[arg(long)]
    pub llm: bool,

    /// LLM API key, used with --llm
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true, display_order = API_KEY_DISPLAY_ORDER)]
    pub api_key: Option<String>,

    #[command(flatten)]
    pub llm_overrides: LlmOverrides,
}
