// src/ai_bootstrap.rs
use crate::analyze::{build_remote_scorer, DynRemoteScorer, RemoteFailure};
use crate::config::ai::AiConfig;
use tracing::{info, warn};

pub struct AiRuntime {
    pub cfg: AiConfig,
    pub client: DynRemoteScorer,
}

impl AiRuntime {
    pub fn from_path(path: &str) -> anyhow::Result<Self> {
        let cfg = AiConfig::load_from_file(path)?;
        // Safe diagnostics: only provider + enabled + key length
        info!(
            provider = %cfg.provider,
            enabled = cfg.enabled,
            key_len = cfg.api_key.len(),
            "AI cfg loaded"
        );
        let client = build_remote_scorer(&cfg);
        Ok(Self { cfg, client })
    }

    /// Score one fixed sample and log the outcome. Returns the failure, if any.
    pub async fn quick_probe(&self) -> Option<RemoteFailure> {
        if !self.cfg.enabled {
            warn!("AI quick_probe skipped: AI is disabled in config");
            return Some(RemoteFailure::Disabled);
        }
        let sample = "Delivery was quick and the support team was really helpful.";
        match self.client.score(sample).await {
            Ok(v) => {
                info!(sentiment = v.sentiment.as_str(), strength = v.strength, "AI quick_probe ok");
                None
            }
            Err(e) => {
                warn!(reason = %e, provider = self.client.provider_name(), "AI quick_probe failed");
                Some(e)
            }
        }
    }
}
