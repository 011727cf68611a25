use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{debug, error, info};

use super::AppState;
use crate::agent::llm::LlmProvider;
use crate::error::Error;
use crate::places::{PlaceQuery, PlacesProvider, SearchResponse};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::BadRequest(_) | Error::ToolArguments(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Provider(_) | Error::ProviderStatus { .. } => {
                error!("Places provider failure: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Error::Config(_) | Error::Llm(_) => {
                error!("Unexpected server error: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "LLM Maps API is running. Use /find-places or /find-places-llm endpoints."
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "API is running normally"
    }))
}

/// Malformed bodies, e.g. a non-integer `top_n`, are client errors like any other bad window
fn place_query(body: Result<Json<PlaceQuery>, JsonRejection>) -> Result<PlaceQuery, Error> {
    body.map(|Json(req)| req).map_err(|rejection| {
        debug!("Rejected request body: {}", rejection.body_text());
        Error::BadRequest(rejection.body_text())
    })
}

/// Search without query rewriting
pub async fn find_places<P, L>(
    State(state): State<AppState<P, L>>,
    body: Result<Json<PlaceQuery>, JsonRejection>,
) -> Result<Json<SearchResponse>, Error>
where
    P: PlacesProvider + 'static,
    L: LlmProvider + 'static,
{
    let req = place_query(body)?;
    info!("Received query: {}", req.query);
    let response = state.search.windowed(&req.query, req.top_n, req.page).await?;
    Ok(Json(response))
}

/// Rewrite the query with the LLM, then search
pub async fn find_places_llm<P, L>(
    State(state): State<AppState<P, L>>,
    body: Result<Json<PlaceQuery>, JsonRejection>,
) -> Result<Json<SearchResponse>, Error>
where
    P: PlacesProvider + 'static,
    L: LlmProvider + 'static,
{
    let req = place_query(body)?;
    info!("Received query for preprocessing: {}", req.query);
    let processed = state.preprocessor.rewrite(&req.query).await;
    if processed != req.query {
        info!("Processed query: {}", processed);
    } else {
        debug!("Searching with the original query");
    }

    let mut response = state.search.windowed(&processed, req.top_n, req.page).await?;
    response.original_query = Some(req.query);
    response.processed_query = Some(processed);
    Ok(Json(response))
}
