use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Error, Result};

#[derive(Deserialize, Serialize, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub prompt: PromptConfig,
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL
    pub base_url: String,
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address `serve` binds to
    pub addr: String,
    /// Backend the chat client sends tool calls to
    pub backend_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8000".to_string(),
            backend_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Wait before following a continuation cursor (milliseconds)
    pub page_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: crate::places::aggregate::DEFAULT_PAGE_DELAY.as_millis() as u64,
        }
    }
}

impl SearchConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
#[serde(default)]
pub struct PromptConfig {
    /// Path of the system prompt file
    pub system_prompt: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_prompt: "system_prompt.txt".to_string(),
        }
    }
}

impl Config {
    /// Load config from `path`, or defaults when the file does not exist
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            debug!("Config file {} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path, e)))?;
        Self::parse(&content).map_err(|e| Error::Config(format!("{}: {}", path, e)))
    }

    fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Write the default config to `path`
    pub fn init(path: &str, r#override: bool) -> Result<()> {
        if Path::new(path).exists() && !r#override {
            return Err(Error::Config(format!(
                "{} already exists, use --override to replace it",
                path
            )));
        }
        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("failed to write {}: {}", path, e)))?;
        info!("Wrote default config to {}", path);
        Ok(())
    }
}

/// Read the system prompt file, trimmed
pub fn load_system_prompt(path: &str) -> Result<String> {
    let prompt = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "system prompt file '{}' could not be read: {}",
            path, e
        ))
    })?;
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(Error::Config(format!("system prompt file '{}' is empty", path)));
    }
    Ok(prompt.to_string())
}
