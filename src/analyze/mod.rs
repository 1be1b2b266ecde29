// src/analyze/mod.rs
//! Scoring entry used by the request handlers: remote model first, local
//! pipeline as the fallback of last resort.

pub mod ai_adapter;

use std::time::Instant;

use tracing::{debug, warn};

use crate::metrics;
use crate::sentiment::{BlendedResult, SentimentAnalyzer, SentimentReport, LOCAL_METHOD};
use crate::telemetry::text_fingerprint;

pub use ai_adapter::{
    build_remote_scorer, parse_verdict, CachingClient, DisabledClient, DynRemoteScorer,
    FailingProvider, MockProvider, Provider, RemoteFailure, RemoteScorer, RemoteVerdict,
};

/// Final verdict plus why the local pipeline was used, if it was.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub result: BlendedResult,
    /// `None` when the remote verdict was used.
    pub fallback: Option<RemoteFailure>,
}

/// Local pipeline only, with timing/metrics.
pub fn score_local(analyzer: &SentimentAnalyzer, text: &str) -> SentimentReport {
    let started = Instant::now();
    let report = analyzer.analyze(text);
    metrics::record_analysis("local", started.elapsed());
    debug!(
        id = %text_fingerprint(text),
        sentiment = report.blended.sentiment.as_str(),
        score = report.blended.score,
        "scored locally"
    );
    report
}

/// Try the remote scorer; on any failure return the local result instead.
///
/// A disabled remote is not a failure: the local method string is kept
/// as-is. Real failures are marked in `method` as `... (fallback: <kind>)`.
pub async fn score_with_fallback(
    remote: &dyn RemoteScorer,
    local: &SentimentAnalyzer,
    text: &str,
) -> Scored {
    let started = Instant::now();
    match remote.score(text).await {
        Ok(verdict) => {
            metrics::record_analysis("remote", started.elapsed());
            Scored {
                result: verdict.into_result(remote.provider_name()),
                fallback: None,
            }
        }
        Err(failure) => {
            let mut result = score_local(local, text).blended;
            if failure != RemoteFailure::Disabled {
                warn!(
                    id = %text_fingerprint(text),
                    provider = remote.provider_name(),
                    reason = %failure,
                    "remote scoring failed; using local fallback"
                );
                metrics::record_fallback(failure.kind());
                result.method = format!("{LOCAL_METHOD} (fallback: {})", failure.kind());
            }
            Scored {
                result,
                fallback: Some(failure),
            }
        }
    }
}
