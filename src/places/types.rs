use serde::{Deserialize, Serialize};

/// Outcome of a places search
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ZERO_RESULTS")]
    ZeroResults,
    #[serde(rename = "ERROR")]
    Error,
    /// Any other status reported by the places provider, passed through as-is
    #[serde(untagged)]
    Provider(String),
}

impl SearchStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// A place as returned to clients, with derived map links
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlaceInfo {
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub place_id: String,
    pub maps_embed_url: String,
    pub maps_direction_url: String,
}

/// Position of a results window inside the aggregated result set
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_results: usize,
    pub results_per_page: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PaginationInfo {
    pub fn new(current_page: usize, total_results: usize, results_per_page: usize) -> Self {
        let total_pages = total_results.div_ceil(results_per_page.max(1));
        Self {
            current_page,
            total_results,
            results_per_page,
            total_pages,
            has_next_page: current_page < total_pages,
            has_prev_page: current_page > 1,
        }
    }
}

/// Body returned by the search endpoints and handed to the LLM as the tool result
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchResponse {
    pub status: SearchStatus,
    #[serde(default)]
    pub results: Vec<PlaceInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_query: Option<String>,
    /// Human-readable reason for an `ERROR` status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SearchResponse {
    pub fn new(status: SearchStatus, results: Vec<PlaceInfo>) -> Self {
        Self {
            status,
            results,
            pagination: None,
            original_query: None,
            processed_query: None,
            detail: None,
        }
    }

    /// Error payload with no results
    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::new(SearchStatus::Error, Vec::new())
        }
    }

    pub fn with_pagination(mut self, pagination: PaginationInfo) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

/// Request body of the search endpoints
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlaceQuery {
    pub query: String,
    #[serde(default = "default_top_n")]
    pub top_n: i64,
    #[serde(default = "default_page")]
    pub page: i64,
}

impl PlaceQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_n: default_top_n(),
            page: default_page(),
        }
    }
}

pub const DEFAULT_TOP_N: i64 = 5;

fn default_top_n() -> i64 {
    DEFAULT_TOP_N
}

fn default_page() -> i64 {
    1
}
