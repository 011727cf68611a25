use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, trace};

use super::provider::{PlacesProvider, ProviderPage, RawPlace};
use crate::error::{Error, Result};

const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

#[derive(Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<RawPlace>,
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

impl TextSearchResponse {
    fn into_page(self) -> Result<ProviderPage> {
        match self.status.as_str() {
            STATUS_OK => Ok(ProviderPage {
                results: self.results,
                next_page_token: self.next_page_token,
            }),
            STATUS_ZERO_RESULTS => Ok(ProviderPage::default()),
            _ => Err(Error::ProviderStatus {
                status: self.status,
                message: self.error_message.unwrap_or_default(),
            }),
        }
    }
}

/// Google Places Text Search client
pub struct GoogleMapsClient {
    client: reqwest::Client,
    api_key: String,
}

impl GoogleMapsClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
        }
    }

    fn search_url(&self, query: &str, page_token: Option<&str>) -> Result<Url> {
        let params: Vec<(&str, &str)> = match page_token {
            Some(token) => vec![("pagetoken", token), ("key", self.api_key.as_str())],
            None => vec![("query", query), ("key", self.api_key.as_str())],
        };
        Url::parse_with_params(TEXT_SEARCH_URL, params).map_err(|e| Error::Provider(e.to_string()))
    }
}

#[async_trait]
impl PlacesProvider for GoogleMapsClient {
    fn api_key(&self) -> &str {
        &self.api_key
    }

    async fn text_search(&self, query: &str, page_token: Option<&str>) -> Result<ProviderPage> {
        debug!(
            "Text search: query='{}', continuation={}",
            query,
            page_token.is_some()
        );
        let url = self.search_url(query, page_token)?;

        let response: TextSearchResponse = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Provider(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::Provider(e.to_string()))?
            .json()
            .await
            .map_err(|e| Error::Provider(format!("malformed text search response: {}", e)))?;

        trace!(
            "Text search status={}, {} results",
            response.status,
            response.results.len()
        );
        response.into_page()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_response_into_page() {
        let response: TextSearchResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "next_page_token": "tok",
                "results": [
                    {"name": "A", "formatted_address": "1 Main St", "rating": 4.5, "place_id": "p1", "types": ["restaurant"]},
                    {"name": "B", "formatted_address": "2 Main St", "place_id": "p2"}
                ]
            }"#,
        )
        .unwrap();
        let page = response.into_page().unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].rating, Some(4.5));
        assert_eq!(page.results[1].rating, None);
        assert_eq!(page.next_page_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_zero_results_is_empty_page() {
        let response: TextSearchResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "results": []}"#).unwrap();
        assert_eq!(response.into_page().unwrap(), ProviderPage::default());
    }

    #[test]
    fn test_denied_status_is_error() {
        let response: TextSearchResponse = serde_json::from_str(
            r#"{"status": "REQUEST_DENIED", "results": [], "error_message": "The provided API key is invalid."}"#,
        )
        .unwrap();
        match response.into_page() {
            Err(Error::ProviderStatus { status, message }) => {
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message, "The provided API key is invalid.");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_search_url_uses_pagetoken_for_continuation() {
        let client = GoogleMapsClient::new("KEY");
        let first = client.search_url("sushi NYC", None).unwrap();
        assert!(first.as_str().contains("query=sushi+NYC"));
        assert!(first.as_str().contains("key=KEY"));
        let next = client.search_url("sushi NYC", Some("abc")).unwrap();
        assert!(next.as_str().contains("pagetoken=abc"));
        assert!(!next.as_str().contains("query="));
    }
}
