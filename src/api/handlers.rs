use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use std::time::Instant;

use crate::error::RecommendError;
use crate::service::RecommendationService;

use super::models::{RecommendRequest, RecommendResponse, StatusResponse};

pub async fn recommend_handler(
    State(service): State<Arc<RecommendationService>>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, (StatusCode, String)> {
    let start = Instant::now();

    let ranked = service
        .recommend(&request.candidates, &request.user_query)
        .await
        .map_err(|e| match e {
            RecommendError::EmptyInput => (StatusCode::BAD_REQUEST, e.to_string()),
        })?;

    let results = ranked.to_records();
    let total_results = results.len();
    let processing_time_ms = start.elapsed().as_millis();

    Ok(Json(RecommendResponse {
        user_query: request.user_query,
        results,
        total_results,
        processing_time_ms,
    }))
}

pub async fn health_handler() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}

pub async fn root_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "bazaar recommender is running",
    })
}
