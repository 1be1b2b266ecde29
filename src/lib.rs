// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analytics;
pub mod analyze;
pub mod api;
pub mod config;
pub mod feedback;
pub mod metrics;
pub mod sentiment;
pub mod telemetry;

pub mod ai_bootstrap;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::sentiment::{BlendedResult, Sentiment, SentimentAnalyzer, SentimentReport};

use axum::Router;
use tracing::info;

/// Full in-process app: state from config/env, API routes, and `/metrics`
/// when `METRICS_ENABLED=1`.
pub async fn app() -> anyhow::Result<Router> {
    let state = AppState::from_env();
    let mut router = api::router(state);
    if crate::metrics::metrics_enabled() {
        if let Some(m) = crate::metrics::Metrics::global() {
            router = router.merge(m.router());
        }
    }
    Ok(router)
}

/// Call this from the entrypoint (after tracing init) to perform a one-off
/// smoke test of the remote scorer. It won't panic on failure; it just logs.
///
/// ```ignore
/// if let Err(e) = feedback_sentiment::run_ai_quick_probe().await {
///     tracing::warn!(error=?e, "AI quick probe didn't run");
/// }
/// ```
pub async fn run_ai_quick_probe() -> anyhow::Result<()> {
    let path = std::env::var(config::ai::ENV_AI_CONFIG_PATH)
        .unwrap_or_else(|_| config::ai::DEFAULT_AI_CONFIG_PATH.to_string());
    let ai = ai_bootstrap::AiRuntime::from_path(&path)?;
    ai.quick_probe().await;
    info!("AI quick probe finished");
    Ok(())
}
