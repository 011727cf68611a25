mod agent;
mod chat;
mod cli;
mod config;
mod error;
mod places;
mod server;

use anyhow::Context;
use clap::Parser;
use cli::{ChatArgs, Cli, Commands, LlmOverrides, SearchArgs, ServeArgs};
use config::Config;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use agent::llm::openai::OpenAIProvider;
use agent::orchestrator::{AnswerMode, Orchestrator};
use agent::preprocess::QueryPreprocessor;
use agent::tool::places::BackendClient;
use chat::ConversationClient;
use places::{GoogleMapsClient, SearchService};

const EXIT_FAILURE: i32 = 1;

#[tokio::main]
async fn main() {
    // A missing .env file is fine, variables may come from the environment
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env loaded: {}", e),
    }

    let result = match cli.command {
        Commands::Init(args) => {
            Config::init(&args.config, args.r#override).map_err(anyhow::Error::from)
        }
        Commands::Serve(args) => serve(args).await,
        Commands::Chat(args) => chat(args).await,
        Commands::Search(args) => search(args).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(EXIT_FAILURE);
    }
}

/// LLM settings after CLI and env overrides are applied over the config file
#[derive(Debug, PartialEq)]
struct LlmSettings<'a> {
    base_url: &'a str,
    model: &'a str,
    prompt_path: &'a str,
}

fn resolve_llm<'a>(config: &'a Config, overrides: &'a LlmOverrides) -> LlmSettings<'a> {
    LlmSettings {
        base_url: overrides.base_url.as_deref().unwrap_or(&config.llm.base_url),
        model: overrides.model.as_deref().unwrap_or(&config.llm.model),
        prompt_path: overrides
            .system_prompt
            .as_deref()
            .unwrap_or(&config.prompt.system_prompt),
    }
}

/// Build the LLM client and read the system prompt, both required before use
fn llm_setup(
    config: &Config,
    api_key: &str,
    overrides: &LlmOverrides,
) -> anyhow::Result<(OpenAIProvider, String)> {
    let settings = resolve_llm(config, overrides);

    let system_prompt = config::load_system_prompt(settings.prompt_path)?;
    debug!("Loaded system prompt from {}", settings.prompt_path);
    info!("Using model {} at {}", settings.model, settings.base_url);

    let llm = OpenAIProvider::new(settings.base_url, api_key, settings.model);
    Ok((llm, system_prompt))
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = Config::load(&args.config)?;
    let (llm, system_prompt) = llm_setup(&config, &args.llm.api_key, &args.llm.overrides)?;

    let search = SearchService::new(
        GoogleMapsClient::new(&args.maps_api_key),
        config.search.page_delay(),
    );
    let state = server::AppState::new(search, QueryPreprocessor::new(llm, system_prompt));

    let addr = args.addr.as_deref().unwrap_or(&config.server.addr);
    server::serve(state, addr, args.static_dir.map(Into::into)).await?;
    Ok(())
}

async fn chat(args: ChatArgs) -> anyhow::Result<()> {
    let config = Config::load(&args.config)?;
    let (llm, system_prompt) = llm_setup(&config, &args.llm.api_key, &args.llm.overrides)?;

    let mode = if args.structured {
        AnswerMode::Structured
    } else {
        AnswerMode::Synthesized
    };

    if args.local {
        let key = args
            .maps_api_key
            .as_deref()
            .context("--local requires GOOGLE_MAPS_API_KEY or --maps-api-key")?;
        let finder = SearchService::new(GoogleMapsClient::new(key), config.search.page_delay());
        info!("Searching in-process");
        ConversationClient::new(Orchestrator::new(llm, finder, mode), &system_prompt)
            .run()
            .await?;
    } else {
        let backend_url = args
            .backend_url
            .as_deref()
            .unwrap_or(&config.server.backend_url);
        info!("Sending searches to {}", backend_url);
        let finder = BackendClient::new(backend_url);
        ConversationClient::new(Orchestrator::new(llm, finder, mode), &system_prompt)
            .run()
            .await?;
    }
    Ok(())
}

async fn search(args: SearchArgs) -> anyhow::Result<()> {
    let config = Config::load(&args.config)?;
    let service = SearchService::new(
        GoogleMapsClient::new(&args.maps_api_key),
        config.search.page_delay(),
    );

    let (query, original) = if args.llm {
        let api_key = args
            .api_key
            .as_deref()
            .context("--llm requires DEEPSEEK_API_KEY or --api-key")?;
        let (llm, system_prompt) = llm_setup(&config, api_key, &args.llm_overrides)?;
        let processed = QueryPreprocessor::new(llm, system_prompt)
            .rewrite(&args.query)
            .await;
        (processed, Some(args.query))
    } else {
        (args.query, None)
    };

    let mut response = service.windowed(&query, args.top_n, args.page).await?;
    if let Some(original) = original {
        response.original_query = Some(original);
        response.processed_query = Some(query);
    }

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
