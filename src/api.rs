use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::analytics::{self, AnalyticsSummary};
use crate::analyze::{score_local, score_with_fallback, DynRemoteScorer};
use crate::config::{ai::AiConfig, scoring};
use crate::feedback::{FeedbackRecord, FeedbackStore};
use crate::metrics;
use crate::sentiment::{BlendedResult, Sentiment, SentimentAnalyzer, SentimentReport};
use crate::telemetry::text_fingerprint;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<SentimentAnalyzer>,
    pub remote: DynRemoteScorer,
    pub store: Arc<FeedbackStore>,
}

impl AppState {
    pub fn new(analyzer: SentimentAnalyzer, remote: DynRemoteScorer, store: FeedbackStore) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            remote,
            store: Arc::new(store),
        }
    }

    /// Scoring params, remote scorer and store capacity from config files/env.
    pub fn from_env() -> Self {
        let params = scoring::load_or_default();
        let ai = AiConfig::load_or_default();
        let remote = crate::analyze::build_remote_scorer(&ai);
        info!(
            remote = remote.provider_name(),
            ai_enabled = ai.enabled,
            "app state ready"
        );
        Self::new(
            SentimentAnalyzer::with_params(params),
            remote,
            FeedbackStore::from_env(),
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/sentiment", post(sentiment))
        .route("/api/analyze", post(analyze_feedback))
        .route("/api/feedback", post(submit_feedback).get(list_feedback))
        .route("/api/feedback/{id}", delete(delete_feedback))
        .route("/api/analytics", get(get_analytics))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ------------------------------------------------------------
// Errors
// ------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} is required")]
    MissingText(&'static str),
    #[error("Feedback not found")]
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MissingText(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Request boundary: blank or missing text never reaches the scorers.
fn require_text(raw: Option<String>, what: &'static str) -> Result<String, ApiError> {
    raw.filter(|t| !t.trim().is_empty())
        .ok_or(ApiError::MissingText(what))
}

// ------------------------------------------------------------
// Handlers
// ------------------------------------------------------------

#[derive(Deserialize)]
struct SentimentReq {
    #[serde(default)]
    text: Option<String>,
}

async fn sentiment(
    State(state): State<AppState>,
    Json(body): Json<SentimentReq>,
) -> Result<Json<SentimentReport>, ApiError> {
    let text = require_text(body.text, "Text")?;
    Ok(Json(score_local(&state.analyzer, &text)))
}

#[derive(Deserialize)]
struct AnalyzeReq {
    #[serde(default, alias = "feedbackText")]
    text: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Serialize)]
struct AnalyzeResp {
    id: u64,
    sentiment: Sentiment,
    score: f64,
    confidence: f64,
    method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<String>,
    created_at: DateTime<Utc>,
}

async fn analyze_feedback(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<AnalyzeResp>, ApiError> {
    let text = require_text(body.text, "Feedback text")?;
    let scored = score_with_fallback(state.remote.as_ref(), &state.analyzer, &text).await;
    let rec = store(&state, &text, body.category, &scored.result);
    Ok(Json(AnalyzeResp {
        id: rec.id,
        sentiment: rec.sentiment,
        score: rec.score,
        confidence: rec.confidence,
        method: rec.method,
        reasoning: scored.result.reasoning,
        created_at: rec.created_at,
    }))
}

#[derive(Deserialize)]
struct SubmitReq {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Serialize)]
struct SubmitResp {
    feedback: FeedbackRecord,
    sentiment: BlendedResult,
}

async fn submit_feedback(
    State(state): State<AppState>,
    Json(body): Json<SubmitReq>,
) -> Result<Json<SubmitResp>, ApiError> {
    let text = require_text(body.message, "Message")?;
    let report = score_local(&state.analyzer, &text);
    let feedback = store(&state, &text, body.category, &report.blended);
    Ok(Json(SubmitResp {
        feedback,
        sentiment: report.blended,
    }))
}

fn store(
    state: &AppState,
    text: &str,
    category: Option<String>,
    result: &BlendedResult,
) -> FeedbackRecord {
    let rec = state.store.record(text, category, result);
    metrics::record_stored();
    info!(
        id = rec.id,
        text_id = %text_fingerprint(text),
        sentiment = rec.sentiment.as_str(),
        method = %rec.method,
        "feedback stored"
    );
    rec
}

#[derive(Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

async fn list_feedback(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Json<Vec<FeedbackRecord>> {
    Json(state.store.list(q.limit))
}

async fn delete_feedback(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.store.delete(id) {
        Ok(Json(json!({ "message": "Feedback deleted successfully" })))
    } else {
        Err(ApiError::NotFound)
    }
}

async fn get_analytics(State(state): State<AppState>) -> Json<AnalyticsSummary> {
    let summary = analytics::summarize(&state.store.snapshot());
    info!(total = summary.total, "analytics summary");
    Json(summary)
}
