use std::time::Duration;
use tracing::{debug, info, warn};

use super::format::format_place;
use super::provider::{PlacesProvider, RawPlace};
use super::types::{PaginationInfo, SearchResponse, SearchStatus};
use crate::error::{Error, Result};

/// Provider calls made per aggregation, first page included.
/// Text search stops issuing continuation cursors after 60 records.
pub const MAX_PAGE_REQUESTS: usize = 3;

/// Upper bound on aggregated records and on `top_n`
pub const MAX_RESULTS: usize = 60;

/// Wait before a freshly issued continuation cursor becomes valid
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(2);

/// Multi-page places search with windowed pagination on top
pub struct SearchService<P> {
    provider: P,
    page_delay: Duration,
}

impl<P: PlacesProvider> SearchService<P> {
    pub fn new(provider: P, page_delay: Duration) -> Self {
        Self {
            provider,
            page_delay,
        }
    }

    /// Collect up to `max_results` records across at most [`MAX_PAGE_REQUESTS`] pages.
    ///
    /// An error on a continuation page stops pagination and keeps what was
    /// already collected. An error on the first page is returned.
    pub async fn aggregate(&self, query: &str, max_results: usize) -> Result<Vec<RawPlace>> {
        let mut places = Vec::new();
        let mut cursor: Option<String> = None;

        for request in 0..MAX_PAGE_REQUESTS {
            if request > 0 {
                // Cursor is rejected if reused immediately
                tokio::time::sleep(self.page_delay).await;
            }

            let page = match self.provider.text_search(query, cursor.as_deref()).await {
                Ok(page) => page,
                Err(e) if request == 0 => return Err(e),
                Err(e) => {
                    warn!(
                        "Stopping pagination for '{}' after page {}: {}",
                        query, request, e
                    );
                    break;
                }
            };
            debug!(
                "Page {} for '{}': {} results",
                request + 1,
                query,
                page.results.len()
            );

            places.extend(page.results);
            if places.len() >= max_results {
                places.truncate(max_results);
                break;
            }
            match page.next_page_token {
                Some(token) => cursor = Some(token),
                None => break,
            }
        }

        Ok(places)
    }

    /// Search and return the `page`-th window of `top_n` results.
    pub async fn windowed(&self, query: &str, top_n: i64, page: i64) -> Result<SearchResponse> {
        let (top_n, page) = validate_window(top_n, page)?;
        info!("Searching '{}' (top_n={}, page={})", query, top_n, page);

        let places = match self.aggregate(query, MAX_RESULTS).await {
            Ok(places) => places,
            Err(Error::ProviderStatus { status, message }) => {
                warn!("Places provider returned {}: {}", status, message);
                return Ok(SearchResponse::new(SearchStatus::Provider(status), Vec::new()));
            }
            Err(e) => return Err(e),
        };

        let total_results = places.len();
        if total_results == 0 {
            return Ok(SearchResponse::new(SearchStatus::ZeroResults, Vec::new())
                .with_pagination(PaginationInfo::default()));
        }

        let start = match (page - 1).checked_mul(top_n) {
            Some(start) if start < total_results => start,
            _ => {
                return Err(Error::NotFound(format!(
                    "Page {} is out of range: {} results at {} per page",
                    page, total_results, top_n
                )));
            }
        };
        let end = start.saturating_add(top_n).min(total_results);

        let key = self.provider.api_key();
        let results = places[start..end]
            .iter()
            .map(|raw| format_place(raw, key))
            .collect();

        Ok(SearchResponse::new(SearchStatus::Ok, results)
            .with_pagination(PaginationInfo::new(page, total_results, top_n)))
    }
}

fn validate_window(top_n: i64, page: i64) -> Result<(usize, usize)> {
    if !(1..=MAX_RESULTS as i64).contains(&top_n) {
        return Err(Error::BadRequest(format!(
            "top_n must be between 1 and {}, got {}",
            MAX_RESULTS, top_n
        )));
    }
    if page < 1 {
        return Err(Error::BadRequest(format!(
            "page must be at least 1, got {}",
            page
        )));
    }
    Ok((top_n as usize, page as usize))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::places::provider::ProviderPage;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Scripted provider: each call pops the next page, recording the cursor it got
    pub(crate) struct MockProvider {
        pages: Mutex<Vec<Result<ProviderPage>>>,
        pub cursors: Mutex<Vec<Option<String>>>,
        pub called_at: Mutex<Vec<Instant>>,
    }

    impl MockProvider {
        pub(crate) fn new(pages: Vec<Result<ProviderPage>>) -> Self {
            Self {
                pages: Mutex::new(pages.into_iter().rev().collect()),
                cursors: Mutex::new(Vec::new()),
                called_at: Mutex::new(Vec::new()),
            }
        }

        /// Serve `total` records, 20 per page, with cursors between pages
        pub(crate) fn with_records(total: usize) -> Self {
            let records = places(total);
            let chunks: Vec<_> = records.chunks(20).map(|c| c.to_vec()).collect();
            let count = chunks.len();
            let pages = chunks
                .into_iter()
                .enumerate()
                .map(|(i, results)| {
                    Ok(ProviderPage {
                        results,
                        next_page_token: (i + 1 < count).then(|| format!("token-{}", i + 1)),
                    })
                })
                .collect();
            Self::new(pages)
        }

        pub(crate) fn calls(&self) -> usize {
            self.cursors.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PlacesProvider for MockProvider {
        fn api_key(&self) -> &str {
            "KEY"
        }

        async fn text_search(&self, _query: &str, page_token: Option<&str>) -> Result<ProviderPage> {
            self.called_at.lock().unwrap().push(Instant::now());
            self.cursors
                .lock()
                .unwrap()
                .push(page_token.map(str::to_string));
            self.pages
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(ProviderPage::default()))
        }
    }

    pub(crate) fn places(count: usize) -> Vec<RawPlace> {
        (0..count)
            .map(|i| RawPlace {
                name: format!("Place {}", i),
                formatted_address: format!("{} Main St", i),
                rating: Some(4.0),
                place_id: format!("id-{}", i),
            })
            .collect()
    }

    fn page(count: usize, offset: usize, token: Option<&str>) -> Result<ProviderPage> {
        Ok(ProviderPage {
            results: places(offset + count)[offset..].to_vec(),
            next_page_token: token.map(str::to_string),
        })
    }

    fn service(provider: MockProvider) -> SearchService<MockProvider> {
        SearchService::new(provider, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_aggregate_stops_after_three_requests() {
        let provider = MockProvider::new(vec![
            page(20, 0, Some("a")),
            page(20, 20, Some("b")),
            page(20, 40, Some("c")),
            page(20, 60, Some("d")),
        ]);
        let service = service(provider);
        let places = service.aggregate("pizza", 1000).await.unwrap();
        assert_eq!(places.len(), 60);
        assert_eq!(service.provider.calls(), MAX_PAGE_REQUESTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aggregate_waits_before_each_cursor() {
        let delay = Duration::from_millis(1500);
        let service = SearchService::new(MockProvider::with_records(60), delay);
        let started = Instant::now();

        let places = service.aggregate("pizza", 60).await.unwrap();

        assert_eq!(places.len(), 60);
        let called_at = service.provider.called_at.lock().unwrap().clone();
        assert_eq!(called_at.len(), 3);
        assert_eq!(called_at[0], started);
        assert_eq!(called_at[1] - called_at[0], delay);
        assert_eq!(called_at[2] - called_at[1], delay);
        assert_eq!(started.elapsed(), delay * 2);
    }

    #[tokio::test]
    async fn test_aggregate_passes_cursor_to_next_request() {
        let service = service(MockProvider::with_records(45));
        let places = service.aggregate("pizza", 60).await.unwrap();
        assert_eq!(places.len(), 45);
        assert_eq!(
            *service.provider.cursors.lock().unwrap(),
            vec![None, Some("token-1".to_string()), Some("token-2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_aggregate_stops_without_cursor() {
        let service = service(MockProvider::new(vec![page(12, 0, None)]));
        let places = service.aggregate("pizza", 60).await.unwrap();
        assert_eq!(places.len(), 12);
        assert_eq!(service.provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_aggregate_stops_at_max_results() {
        let service = service(MockProvider::with_records(60));
        let places = service.aggregate("pizza", 15).await.unwrap();
        assert_eq!(places.len(), 15);
        assert_eq!(service.provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_aggregate_keeps_partial_results_on_later_error() {
        let service = service(MockProvider::new(vec![
            page(20, 0, Some("a")),
            Err(Error::Provider("connection reset".into())),
        ]));
        let places = service.aggregate("pizza", 60).await.unwrap();
        assert_eq!(places.len(), 20);
        assert_eq!(service.provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_aggregate_first_page_error_propagates() {
        let service = service(MockProvider::new(vec![Err(Error::Provider(
            "connection refused".into(),
        ))]));
        assert!(matches!(
            service.aggregate("pizza", 60).await,
            Err(Error::Provider(_))
        ));
    }

    #[tokio::test]
    async fn test_windowed_second_page_of_twelve() {
        let service = service(MockProvider::new(vec![page(12, 0, None)]));
        let response = service.windowed("sushi NYC", 5, 2).await.unwrap();
        assert_eq!(response.status, SearchStatus::Ok);
        let ids: Vec<_> = response.results.iter().map(|p| p.place_id.as_str()).collect();
        assert_eq!(ids, vec!["id-5", "id-6", "id-7", "id-8", "id-9"]);
        let pagination = response.pagination.unwrap();
        assert_eq!(pagination.current_page, 2);
        assert_eq!(pagination.total_results, 12);
        assert_eq!(pagination.results_per_page, 5);
        assert_eq!(pagination.total_pages, 3);
        assert!(pagination.has_next_page);
        assert!(pagination.has_prev_page);
    }

    #[tokio::test]
    async fn test_windowed_last_partial_page() {
        let service = service(MockProvider::new(vec![page(12, 0, None)]));
        let response = service.windowed("sushi NYC", 5, 3).await.unwrap();
        assert_eq!(response.results.len(), 2);
        let pagination = response.pagination.unwrap();
        assert!(!pagination.has_next_page);
        assert!(pagination.has_prev_page);
    }

    #[tokio::test]
    async fn test_windowed_pages_cover_aggregate_exactly() {
        for top_n in [1, 4, 5, 7, 20, 60] {
            let total_pages = 45usize.div_ceil(top_n as usize);
            let mut seen = Vec::new();
            for page in 1..=total_pages as i64 {
                let service = service(MockProvider::with_records(45));
                let response = service.windowed("pizza", top_n, page).await.unwrap();
                seen.extend(response.results.into_iter().map(|p| p.place_id));
            }
            let expected: Vec<_> = (0..45).map(|i| format!("id-{}", i)).collect();
            assert_eq!(seen, expected, "top_n={}", top_n);
        }
    }

    #[tokio::test]
    async fn test_windowed_empty_is_zero_results() {
        let service = service(MockProvider::new(vec![Ok(ProviderPage::default())]));
        let response = service.windowed("nothing here", 5, 1).await.unwrap();
        assert_eq!(response.status, SearchStatus::ZeroResults);
        assert!(response.results.is_empty());
        assert_eq!(response.pagination, Some(PaginationInfo::default()));
    }

    #[tokio::test]
    async fn test_windowed_page_out_of_range_is_not_found() {
        let service = service(MockProvider::new(vec![page(10, 0, None)]));
        assert!(matches!(
            service.windowed("pizza", 5, 3).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_windowed_huge_page_is_not_found() {
        for (top_n, page) in [(60, i64::MAX), (4, (1 << 62) + 1), (5, i64::MAX / 5 + 2)] {
            let service = service(MockProvider::with_records(12));
            assert!(
                matches!(
                    service.windowed("sushi", top_n, page).await,
                    Err(Error::NotFound(_))
                ),
                "top_n={} page={}",
                top_n,
                page
            );
        }
    }

    #[tokio::test]
    async fn test_windowed_rejects_bad_window_without_calling_provider() {
        for (top_n, page) in [(0, 1), (61, 1), (-3, 1), (5, 0), (5, -1)] {
            let service = service(MockProvider::with_records(10));
            assert!(matches!(
                service.windowed("pizza", top_n, page).await,
                Err(Error::BadRequest(_))
            ));
            assert_eq!(service.provider.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_windowed_passes_provider_status_through() {
        let service = service(MockProvider::new(vec![Err(Error::ProviderStatus {
            status: "OVER_QUERY_LIMIT".into(),
            message: "quota".into(),
        })]));
        let response = service.windowed("pizza", 5, 1).await.unwrap();
        assert_eq!(
            response.status,
            SearchStatus::Provider("OVER_QUERY_LIMIT".into())
        );
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_windowed_transport_error_propagates() {
        let service = service(MockProvider::new(vec![Err(Error::Provider("timeout".into()))]));
        assert!(matches!(
            service.windowed("pizza", 5, 1).await,
            Err(Error::Provider(_))
        ));
    }
}
