use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::agent::types::{Tool, ToolFunction};
use crate::error::{Error, Result};
use crate::places::{PlaceQuery, PlacesProvider, SearchResponse, SearchService};

pub const FIND_PLACES_TOOL_NAME: &str = "find_places_on_map";

const FIND_PLACES_DESCRIPTION: &str = "Searches for places like restaurants, cafes, parks, or points of interest based on a user's query.";

/// Arguments of the `find_places_on_map` tool
#[derive(Deserialize, JsonSchema, Debug)]
pub struct FindPlacesArgs {
    /// The user's search query, e.g., 'best pizza in New York' or 'parks near me'
    pub query: String,
}

impl FindPlacesArgs {
    /// Parse the raw JSON arguments emitted by the model
    pub fn parse(arguments: &str) -> Result<Self> {
        let args: Self =
            serde_json::from_str(arguments).map_err(|e| Error::ToolArguments(e.to_string()))?;
        if args.query.trim().is_empty() {
            return Err(Error::ToolArguments("query must not be empty".to_string()));
        }
        Ok(args)
    }
}

/// Declaration of the single tool offered to the model
pub fn find_places_tool() -> Tool {
    Tool {
        tool_type: "function".to_string(),
        function: ToolFunction {
            name: FIND_PLACES_TOOL_NAME.to_string(),
            description: FIND_PLACES_DESCRIPTION.to_string(),
            parameters: parameters_schema(),
        },
    }
}

fn parameters_schema() -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(FindPlacesArgs))
        .unwrap_or_else(|_| Value::Object(Default::default()));
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
        object.remove("description");
    }
    schema
}

/// Executes the `find_places_on_map` tool
#[async_trait]
pub trait PlaceFinder: Send + Sync {
    async fn find_places(&self, query: &str) -> Result<SearchResponse>;
}

/// Runs the search in-process, returning the first page of default size
#[async_trait]
impl<P: PlacesProvider> PlaceFinder for SearchService<P> {
    async fn find_places(&self, query: &str) -> Result<SearchResponse> {
        let request = PlaceQuery::new(query);
        self.windowed(&request.query, request.top_n, request.page).await
    }
}

/// Calls a running `placefinder serve` backend over HTTP
pub struct BackendClient {
    client: reqwest::Client,
    endpoint: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/find-places", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl PlaceFinder for BackendClient {
    async fn find_places(&self, query: &str) -> Result<SearchResponse> {
        debug!("POST {} query='{}'", self.endpoint, query);
        self.client
            .post(&self.endpoint)
            .json(&PlaceQuery::new(query))
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Could not connect to the mapping service: {}", e)))?
            .error_for_status()
            .map_err(|e| Error::Provider(e.to_string()))?
            .json()
            .await
            .map_err(|e| Error::Provider(format!("malformed search response: {}", e)))
    }
}
