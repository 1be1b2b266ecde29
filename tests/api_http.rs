// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /api/sentiment      (report shape, 400 on blank/missing text)
// - POST /api/feedback       (store + verdict)
// - GET  /api/feedback       (newest first, limit)
// - DELETE /api/feedback/{id}
// - GET  /api/analytics

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use feedback_sentiment::analyze::DisabledClient;
use feedback_sentiment::feedback::FeedbackStore;
use feedback_sentiment::{api, AppState, SentimentAnalyzer};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Local-only router with a fresh store.
fn test_router() -> Router {
    let state = AppState::new(
        SentimentAnalyzer::new(),
        Arc::new(DisabledClient),
        FeedbackStore::with_capacity(100),
    );
    api::router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Json>) -> (StatusCode, Json) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .clone()
        .oneshot(req.body(body).expect("build request"))
        .await
        .expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "ok");
}

#[tokio::test]
async fn sentiment_returns_full_report() {
    let app = test_router();
    let (status, v) = send(
        &app,
        "POST",
        "/api/sentiment",
        Some(json!({ "text": "This product is excellent and amazing" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["message"], "This product is excellent and amazing");
    assert_eq!(v["textblob"]["sentiment"], "Positive");
    assert_eq!(v["vader"]["sentiment"], "Positive");
    assert_eq!(v["final"]["sentiment"], "Positive");
    assert_eq!(v["final"]["method"], "Combined TextBlob + VADER");

    let score = v["final"]["score"].as_f64().expect("score");
    let conf = v["final"]["confidence"].as_f64().expect("confidence");
    assert_eq!(conf, score.abs());
}

#[tokio::test]
async fn blank_or_missing_text_is_a_client_error() {
    let app = test_router();
    for body in [json!({ "text": "   " }), json!({})] {
        let (status, v) = send(&app, "POST", "/api/sentiment", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(v["error"], "Text is required");
    }

    let (status, v) = send(&app, "POST", "/api/feedback", Some(json!({ "message": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "Message is required");

    let (status, _) = send(&app, "POST", "/api/analyze", Some(json!({ "category": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn feedback_lifecycle_and_analytics() {
    let app = test_router();

    let (status, v) = send(
        &app,
        "POST",
        "/api/feedback",
        Some(json!({ "message": "This is terrible and awful", "category": "shipping" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["sentiment"]["sentiment"], "Negative");
    assert_eq!(v["feedback"]["category"], "shipping");
    let first_id = v["feedback"]["id"].as_u64().expect("id");

    // /api/analyze with the remote disabled scores locally and keeps the plain method
    let (status, v) = send(
        &app,
        "POST",
        "/api/analyze",
        Some(json!({ "feedbackText": "Really great support, very happy", "category": "support" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["sentiment"], "Positive");
    assert_eq!(v["method"], "Combined TextBlob + VADER");
    assert!(v.get("reasoning").is_none());
    assert!(v["created_at"].is_string());

    let (_, v) = send(&app, "POST", "/api/feedback", Some(json!({ "message": "The package arrived on Tuesday" }))).await;
    assert_eq!(v["sentiment"]["sentiment"], "Neutral");

    let (status, list) = send(&app, "GET", "/api/feedback", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = list.as_array().expect("array");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["text"], "The package arrived on Tuesday");

    let (_, limited) = send(&app, "GET", "/api/feedback?limit=1", None).await;
    assert_eq!(limited.as_array().map(Vec::len), Some(1));

    let (status, a) = send(&app, "GET", "/api/analytics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(a["total"], 3);
    assert_eq!(a["sentimentCounts"]["positive"], 1);
    assert_eq!(a["sentimentCounts"]["neutral"], 1);
    assert_eq!(a["sentimentCounts"]["negative"], 1);
    assert_eq!(a["sentimentPercentages"]["positive"], 33.3);
    assert_eq!(a["categoryDistribution"]["shipping"], 1);
    assert_eq!(a["categoryDistribution"]["support"], 1);
    assert_eq!(a["dailyTrends"].as_array().map(Vec::len), Some(1));

    let uri = format!("/api/feedback/{first_id}");
    let (status, v) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["message"], "Feedback deleted successfully");

    let (status, v) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"], "Feedback not found");

    let (_, a) = send(&app, "GET", "/api/analytics", None).await;
    assert_eq!(a["total"], 2);
}
