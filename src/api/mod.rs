use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::service::RecommendationService;

pub mod handlers;
pub mod models;

pub fn create_router(service: Arc<RecommendationService>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/api/recommend", post(handlers::recommend_handler))
        .with_state(service)
        .layer(cors)
}
