use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::Html,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{Movie, RecommendationRequest, RecommendationResponse, CATALOG},
};

use super::{
    page::{render_page, SearchOutcome},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "backend": state.recommender.name(),
        })),
    )
}

/// The full catalog
pub async fn list_movies() -> Json<Vec<Movie>> {
    Json(CATALOG.to_vec())
}

/// JSON recommendations for one query
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Json(request) = payload?;
    if request.query.trim().is_empty() {
        return Err(AppError::InvalidInput("Query cannot be empty".to_string()));
    }

    tracing::info!(
        request_id = %request_id,
        backend = state.recommender.name(),
        "Processing recommendation request"
    );

    let movies = state
        .recommender
        .recommend(&request.query)
        .await
        .inspect_err(|e| tracing::error!(request_id = %request_id, error = %e, "Search failed"))?;

    tracing::info!(
        request_id = %request_id,
        results = movies.len(),
        "Recommendation completed"
    );

    Ok(Json(RecommendationResponse {
        backend: state.summary.backend,
        movies,
        generated_at: Utc::now(),
    }))
}

/// Search page; runs the query when `?q=` is non-empty
///
/// Failures never turn into an error status here: the page shows the
/// message and the user resubmits.
pub async fn index(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<PageQuery>,
) -> Html<String> {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());

    let outcome = match query {
        None => None,
        Some(query) => {
            tracing::info!(request_id = %request_id, "Searching for movies");
            let outcome = match state.recommender.recommend(query).await {
                Ok(movies) => SearchOutcome::from_movies(movies),
                Err(e) => {
                    tracing::error!(request_id = %request_id, error = %e, "Search failed");
                    SearchOutcome::Failed(e.to_string())
                }
            };
            Some(outcome)
        }
    };

    Html(render_page(&state.summary, query, outcome.as_ref()))
}
