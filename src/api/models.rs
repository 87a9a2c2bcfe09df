use serde::{Deserialize, Serialize};

use crate::data_models::{ListingRecord, SearchRequest};

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub candidates: Vec<SearchRequest>,
    #[serde(default)]
    pub user_query: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub user_query: String,
    pub results: Vec<ListingRecord>,
    pub total_results: usize,
    pub processing_time_ms: u128,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}
