use std::time::Duration;

use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::warn;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

static GLOBAL: OnceCell<Option<Metrics>> = OnceCell::new();

impl Metrics {
    /// Install the process-wide Prometheus recorder once. Returns `None` if a
    /// different recorder was installed first.
    pub fn global() -> Option<&'static Metrics> {
        GLOBAL
            .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                Ok(handle) => {
                    describe();
                    Some(Metrics { handle })
                }
                Err(e) => {
                    warn!(error = %e, "prometheus recorder not installed");
                    None
                }
            })
            .as_ref()
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// `METRICS_ENABLED=1` mounts `/metrics`.
pub fn metrics_enabled() -> bool {
    std::env::var("METRICS_ENABLED").ok().as_deref() == Some("1")
}

fn describe() {
    describe_counter!(
        "sentiment_analyses_total",
        "Texts scored, labelled by the method that produced the final verdict."
    );
    describe_counter!(
        "sentiment_remote_fallbacks_total",
        "Remote scoring attempts that fell back to the local pipeline."
    );
    describe_counter!("feedback_stored_total", "Feedback records stored.");
    describe_histogram!("sentiment_analyze_ms", "Scoring time in milliseconds.");
}

pub fn record_analysis(method: &'static str, elapsed: Duration) {
    counter!("sentiment_analyses_total", "method" => method).increment(1);
    histogram!("sentiment_analyze_ms").record(elapsed.as_secs_f64() * 1000.0);
}

pub fn record_fallback(reason: &'static str) {
    counter!("sentiment_remote_fallbacks_total", "reason" => reason).increment(1);
}

pub fn record_stored() {
    counter!("feedback_stored_total").increment(1);
}
