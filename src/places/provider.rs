use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;

/// A place candidate as the provider reports it
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct RawPlace {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub rating: Option<f64>,
    pub place_id: String,
}

/// One page of text search results
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProviderPage {
    pub results: Vec<RawPlace>,
    /// Cursor for the following page, absent on the last page
    pub next_page_token: Option<String>,
}

/// Free-text places search with cursor-based continuation.
///
/// Implementations return `Ok` with an empty page for a query that matched
/// nothing, and `Error::ProviderStatus` for any other non-OK provider status.
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Provider key embedded in the map links
    fn api_key(&self) -> &str;

    async fn text_search(&self, query: &str, page_token: Option<&str>) -> Result<ProviderPage>;
}
