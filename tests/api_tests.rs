use anyhow::Result;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

use bazaar::api::create_router;
use bazaar::config::RecommenderConfig;
use bazaar::data_models::ShippingPayer;
use bazaar::service::RecommendationService;

mod common;
use common::*;

fn app(provider: StubProvider) -> axum::Router {
    let service = RecommendationService::new(Arc::new(provider), RecommenderConfig::default());
    create_router(Arc::new(service))
}

fn post_json(uri: &str, payload: serde_json::Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))?)
}

#[tokio::test]
async fn test_health_ok() -> Result<()> {
    let response = app(StubProvider::new())
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body::to_bytes(response.into_body(), usize::MAX).await?;
    let json: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(json["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn test_recommend_returns_presenter_records() -> Result<()> {
    let provider = StubProvider::new()
        .with_search("Sony TV", vec![listing("m1", "Sony TV 24型", 15_500, 4.8)])
        .with_search("ソニー テレビ", vec![listing("m2", "ソニー テレビ 32型", 20_000, 4.1)])
        .with_detail("m1", shipped_by(ShippingPayer::Seller));
    let payload = serde_json::json!({
        "user_query": "a Sony TV under 30000 yen",
        "candidates": [
            {"keywords": "Sony TV", "max_price_jpy": 30000, "shipping_preference": "seller_pays"},
            {"keywords": "ソニー テレビ", "max_price": 30000, "location": "東京"}
        ]
    });

    let response = app(provider)
        .oneshot(post_json("/api/recommend", payload)?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body::to_bytes(response.into_body(), usize::MAX).await?;
    let json: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(json["total_results"], 2);
    assert_eq!(json["results"][0]["id"], "m1");
    assert_eq!(json["results"][0]["url"], "https://jp.mercari.com/item/m1");
    assert_eq!(json["results"][0]["shipping_payer"], "seller");
    assert_eq!(json["user_query"], "a Sony TV under 30000 yen");
    Ok(())
}

#[tokio::test]
async fn test_recommend_rejects_empty_candidates() -> Result<()> {
    let payload = serde_json::json!({ "user_query": "tv", "candidates": [] });

    let response = app(StubProvider::new())
        .oneshot(post_json("/api/recommend", payload)?)
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_recommend_with_failing_provider_is_empty_ok() -> Result<()> {
    let provider = StubProvider::new().with_failing_search("tv");
    let payload = serde_json::json!({ "user_query": "tv", "candidates": [{"keywords": "tv"}] });

    let response = app(provider)
        .oneshot(post_json("/api/recommend", payload)?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body::to_bytes(response.into_body(), usize::MAX).await?;
    let json: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(json["total_results"], 0);
    assert!(json["results"].as_array().is_some_and(|r| r.is_empty()));
    Ok(())
}
