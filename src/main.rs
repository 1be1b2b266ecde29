//! Feedback Sentiment Service — Binary Entrypoint
//! Boots the Axum HTTP server with shared state, routes and middleware.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    // Dev tracing (no-op in production).
    feedback_sentiment::telemetry::init_dev_tracing();

    if std::env::var("AI_PROBE_ON_START").ok().as_deref() == Some("1") {
        if let Err(e) = feedback_sentiment::run_ai_quick_probe().await {
            tracing::warn!(error = ?e, "AI quick probe didn't run");
        }
    }

    let router = feedback_sentiment::app().await?;
    Ok(router.into())
}
