//! Route handler functions for all API endpoints.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use wikisent_vector::{usable_matches, RecordId};

use crate::error::ApiError;
use crate::state::AppState;

/// Upper bound on `top_k` accepted from clients.
pub const MAX_TOP_K: usize = 100;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub text: String,
    pub top_k: Option<usize>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub records: usize,
    pub dimensions: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchResponse {
    pub id: RecordId,
    pub text: String,
    pub score: f64,
    /// Position in the unfiltered result.
    pub rank: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub matches: Vec<MatchResponse>,
    /// Matches dropped by the score threshold.
    pub suppressed: usize,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let index = state.pipeline.index();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: state.started_at,
        uptime_secs: state.start_time.elapsed().as_secs(),
        records: index.len(),
        dimensions: index.dimensions(),
    })
}

/// GET /search?q=...&top_k=...
pub async fn search_get(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let text = params
        .q
        .ok_or_else(|| ApiError::BadRequest("query parameter 'q' is required".to_string()))?;
    run_search(state, text, params.top_k).await.map(Json)
}

/// POST /search with `{"text": ..., "top_k": ...}`
pub async fn search_post(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(state, body.text, body.top_k).await.map(Json)
}

async fn run_search(
    state: AppState,
    text: String,
    top_k: Option<usize>,
) -> Result<SearchResponse, ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest("query text must not be empty".to_string()));
    }

    let top_k = top_k.unwrap_or(state.config.search.top_k);
    if top_k == 0 {
        return Err(ApiError::BadRequest("'top_k' must be at least 1".to_string()));
    }
    let top_k = top_k.min(MAX_TOP_K);

    // Encoding can be CPU-heavy (ONNX); keep it off the async workers.
    let pipeline = state.pipeline.clone();
    let query = text.clone();
    let matches = tokio::task::spawn_blocking(move || pipeline.query(&query, top_k))
        .await
        .map_err(|e| ApiError::Internal(format!("search task failed: {}", e)))??;

    let threshold = state.config.search.score_threshold;
    let usable: Vec<MatchResponse> = usable_matches(&matches, threshold)
        .into_iter()
        .map(|(rank, m)| MatchResponse {
            id: m.record_id,
            text: m.text.clone(),
            score: m.score,
            rank,
        })
        .collect();
    let suppressed = matches.len() - usable.len();

    debug!(top_k, returned = usable.len(), suppressed, "Search served");

    Ok(SearchResponse {
        query: text,
        matches: usable,
        suppressed,
    })
}
