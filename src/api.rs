use std::sync::Arc;

use axum::{
    extract::{Query as QueryParams, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::error::SearchError;
use crate::search::{AggregationEngine, AggregationResult, Query};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AggregationEngine>,
}

impl AppState {
    pub fn new(engine: AggregationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search))
        .route("/sources", get(sources))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, serde::Deserialize)]
struct SearchParams {
    #[serde(default)]
    keywords: String,
    #[serde(default)]
    location: String,
    /// Per-source bound; falls back to the engine setting.
    per_source: Option<usize>,
    /// Overall cap after dedup; falls back to the engine setting.
    limit: Option<usize>,
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, e: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: e.to_string(),
        }),
    )
}

async fn search(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<AggregationResult>, ApiError> {
    let mut query = Query::new(params.keywords, params.location);
    if let Some(n) = params.per_source {
        query = query.with_max_results_per_source(n);
    }
    let limit = params.limit.or(state.engine.settings().max_results);

    match state.engine.search_with_limit(&query, limit).await {
        Ok(result) => Ok(Json(result)),
        Err(e @ SearchError::InvalidQuery(_)) => Err(api_error(StatusCode::BAD_REQUEST, e)),
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e)),
    }
}

#[derive(serde::Serialize)]
struct SourcesOut {
    count: usize,
    sources: Vec<String>,
}

async fn sources(State(state): State<AppState>) -> Json<SourcesOut> {
    let sources = state.engine.source_names();
    Json(SourcesOut {
        count: sources.len(),
        sources,
    })
}
