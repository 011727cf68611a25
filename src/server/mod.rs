//! HTTP backend exposing the places search as JSON endpoints.

mod handlers;

use axum::Router;
use axum::routing::{get, post};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use crate::agent::llm::LlmProvider;
use crate::agent::preprocess::QueryPreprocessor;
use crate::error::{Error, Result};
use crate::places::{PlacesProvider, SearchService};

/// Shared, read-only state of the request handlers
pub struct AppState<P, L> {
    search: Arc<SearchService<P>>,
    preprocessor: Arc<QueryPreprocessor<L>>,
}

impl<P, L> AppState<P, L> {
    pub fn new(search: SearchService<P>, preprocessor: QueryPreprocessor<L>) -> Self {
        Self {
            search: Arc::new(search),
            preprocessor: Arc::new(preprocessor),
        }
    }
}

impl<P, L> Clone for AppState<P, L> {
    fn clone(&self) -> Self {
        Self {
            search: self.search.clone(),
            preprocessor: self.preprocessor.clone(),
        }
    }
}

/// Build the application router. Unmatched paths are served from `static_dir` when set.
pub fn router<P, L>(state: AppState<P, L>, static_dir: Option<PathBuf>) -> Router
where
    P: PlacesProvider + 'static,
    L: LlmProvider + 'static,
{
    let router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/find-places", post(handlers::find_places::<P, L>))
        .route("/find-places-llm", post(handlers::find_places_llm::<P, L>));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(CorsLayer::permissive()).with_state(state)
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve<P, L>(state: AppState<P, L>, addr: &str, static_dir: Option<PathBuf>) -> Result<()>
where
    P: PlacesProvider + 'static,
    L: LlmProvider + 'static,
{
    let app = router(state, static_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Config(format!("failed to bind {}: {}", addr, e)))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received Ctrl+C, shutting down");
        })
        .await
        .map_err(|e| Error::Config(e.to_string()))
}
