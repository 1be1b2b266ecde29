//! AI adapter: remote sentiment provider abstraction + file cache + daily limit.
//!
//! A `Provider` does the raw remote call and returns the model's message
//! content. `CachingClient` wraps any provider with a per-text file cache and a
//! per-day call budget, and parses the content into a `RemoteVerdict`. Every
//! failure is a typed `RemoteFailure` so callers can fall back to local scoring.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ai::AiConfig;
use crate::sentiment::{BlendedResult, Sentiment};

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Strength assigned when a label had to be salvaged from prose.
const SALVAGED_STRENGTH: f64 = 0.75;
const NEUTRAL_STRENGTH: f64 = 0.5;
const MAX_REASONING_CHARS: usize = 280;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// What a remote model said about one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteVerdict {
    pub sentiment: Sentiment,
    /// Strength in [0, 1]; the direction comes from `sentiment`.
    pub strength: f64,
    pub reasoning: String,
}

impl RemoteVerdict {
    pub fn signed_score(&self) -> f64 {
        match self.sentiment {
            Sentiment::Positive => self.strength,
            Sentiment::Negative => -self.strength,
            Sentiment::Neutral => 0.0,
        }
    }

    /// Final result carrying the model's own label and explanation.
    pub fn into_result(self, provider: &str) -> BlendedResult {
        let score = self.signed_score().clamp(-1.0, 1.0);
        BlendedResult {
            score,
            sentiment: self.sentiment,
            confidence: score.abs(),
            method: format!("Remote model ({provider})"),
            reasoning: (!self.reasoning.is_empty()).then_some(self.reasoning),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteFailure {
    #[error("remote scoring is disabled")]
    Disabled,
    #[error("no API key configured")]
    MissingKey,
    #[error("daily call limit reached")]
    DailyLimit,
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("response did not contain a usable verdict")]
    Unparseable,
}

impl RemoteFailure {
    /// Short, label-safe name (metrics, method suffix).
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteFailure::Disabled => "disabled",
            RemoteFailure::MissingKey => "missing-key",
            RemoteFailure::DailyLimit => "daily-limit",
            RemoteFailure::Timeout => "timeout",
            RemoteFailure::Transport(_) => "transport",
            RemoteFailure::Status(_) => "status",
            RemoteFailure::Unparseable => "unparseable",
        }
    }
}

/// Scorer used by handlers and the fallback composition.
#[async_trait]
pub trait RemoteScorer: Send + Sync {
    async fn score(&self, text: &str) -> Result<RemoteVerdict, RemoteFailure>;
    /// Provider name for diagnostics and the `method` string.
    fn provider_name(&self) -> &'static str;
}

pub type DynRemoteScorer = Arc<dyn RemoteScorer>;

/// Factory: build a scorer according to config and environment variables.
///
/// * `AI_TEST_MODE=mock` → deterministic mock, cached.
/// * `AI_TEST_MODE=error` → provider that always fails with a transport error.
/// * `AI_TEST_MODE=daily-limit` → mock with a zero budget.
/// * Else if `config.enabled == false` → disabled client.
/// * Else the real provider wrapped with caching + daily limit.
pub fn build_remote_scorer(config: &AiConfig) -> DynRemoteScorer {
    let cache_dir = default_cache_dir();
    match std::env::var("AI_TEST_MODE").unwrap_or_default().as_str() {
        "mock" => {
            return Arc::new(CachingClient::new(
                MockProvider::neutral(),
                cache_dir,
                config.daily_limit,
            ))
        }
        "error" => {
            return Arc::new(CachingClient::new(
                FailingProvider {
                    failure: RemoteFailure::Transport("simulated outage".into()),
                },
                cache_dir,
                config.daily_limit,
            ))
        }
        "daily-limit" => {
            return Arc::new(CachingClient::new(MockProvider::neutral(), cache_dir, 0))
        }
        _ => {}
    }

    if !config.enabled {
        return Arc::new(DisabledClient);
    }

    match config.provider.as_str() {
        "openai" => match OpenAiProvider::new(config) {
            Ok(provider) => Arc::new(CachingClient::new(provider, cache_dir, config.daily_limit)),
            Err(e) => {
                warn!(error = ?e, "could not build OpenAI client; remote scoring disabled");
                Arc::new(DisabledClient)
            }
        },
        other => {
            warn!(provider = other, "unsupported AI provider; remote scoring disabled");
            Arc::new(DisabledClient)
        }
    }
}

// ------------------------------------------------------------
// Provider abstraction + concrete providers
// ------------------------------------------------------------

/// Low-level provider: does the *real* remote call and returns raw message
/// content. Separated so the same caching wrapper serves production and tests.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    async fn complete(&self, text: &str) -> Result<String, RemoteFailure>;
    fn name(&self) -> &'static str;
}

/// Any OpenAI-compatible chat completions endpoint.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiProvider {
    pub fn new(config: &AiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("feedback-sentiment/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_ENDPOINT.to_string()),
        })
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, text: &str) -> Result<String, RemoteFailure> {
        if self.api_key.trim().is_empty() {
            return Err(RemoteFailure::MissingKey);
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            #[serde(default)]
            content: Option<String>,
        }

        let sys = "You classify customer feedback. Reply with ONLY a JSON object: \
                   {\"sentiment\": \"positive|neutral|negative\", \"score\": 0.00-1.00, \
                   \"reasoning\": \"one short sentence\"}. The score is the strength of \
                   the sentiment; values near 1.00 mean strong sentiment.";
        let user = format!("Analyze this feedback: \"{text}\"");
        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: sys,
                },
                Msg {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: 0.0,
            max_tokens: 120,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RemoteFailure::Status(status.as_u16()));
        }
        let body: Resp = resp.json().await.map_err(|_| RemoteFailure::Unparseable)?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(RemoteFailure::Unparseable)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

fn transport_failure(e: reqwest::Error) -> RemoteFailure {
    if e.is_timeout() {
        RemoteFailure::Timeout
    } else {
        RemoteFailure::Transport(e.to_string())
    }
}

/// Always fails with `Disabled`; used when remote scoring is off.
pub struct DisabledClient;

#[async_trait]
impl RemoteScorer for DisabledClient {
    async fn score(&self, _text: &str) -> Result<RemoteVerdict, RemoteFailure> {
        Err(RemoteFailure::Disabled)
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Returns a fixed message content, for tests and local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub content: String,
}

impl MockProvider {
    pub fn neutral() -> Self {
        Self {
            content: r#"{"sentiment": "neutral", "score": 0.5, "reasoning": "Neutral verdict (mock)"}"#
                .to_string(),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, _text: &str) -> Result<String, RemoteFailure> {
        Ok(self.content.clone())
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Always fails with the given failure.
#[derive(Clone)]
pub struct FailingProvider {
    pub failure: RemoteFailure,
}

#[async_trait]
impl Provider for FailingProvider {
    async fn complete(&self, _text: &str) -> Result<String, RemoteFailure> {
        Err(self.failure.clone())
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

// ------------------------------------------------------------
// Response parsing
// ------------------------------------------------------------

/// Turn model output into a verdict.
///
/// Accepts a JSON object (possibly wrapped in prose or code fences). If there
/// is no usable JSON, a label mentioned in the prose is salvaged; "positive"
/// is checked before "negative", then "neutral". Nothing recognizable is
/// `Unparseable`.
pub fn parse_verdict(content: &str) -> Result<RemoteVerdict, RemoteFailure> {
    #[derive(Deserialize)]
    struct Wire {
        sentiment: String,
        #[serde(default)]
        score: Option<f64>,
        #[serde(default)]
        reasoning: Option<String>,
    }

    let trimmed = content.trim();
    let json_part = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(a), Some(b)) if a < b => &trimmed[a..=b],
        _ => trimmed,
    };

    if let Ok(w) = serde_json::from_str::<Wire>(json_part) {
        if let Some(sentiment) = Sentiment::from_label(&w.sentiment) {
            let fallback_strength = match sentiment {
                Sentiment::Neutral => NEUTRAL_STRENGTH,
                _ => SALVAGED_STRENGTH,
            };
            let strength = w
                .score
                .filter(|s| s.is_finite())
                .unwrap_or(fallback_strength)
                .clamp(0.0, 1.0);
            return Ok(RemoteVerdict {
                sentiment,
                strength,
                reasoning: sanitize_reasoning(w.reasoning.as_deref().unwrap_or_default()),
            });
        }
    }

    let lower = content.to_lowercase();
    let (sentiment, strength) = if lower.contains("positive") {
        (Sentiment::Positive, SALVAGED_STRENGTH)
    } else if lower.contains("negative") {
        (Sentiment::Negative, SALVAGED_STRENGTH)
    } else if lower.contains("neutral") {
        (Sentiment::Neutral, NEUTRAL_STRENGTH)
    } else {
        return Err(RemoteFailure::Unparseable);
    };
    Ok(RemoteVerdict {
        sentiment,
        strength,
        reasoning: format!("Analyzed as {}", sentiment.as_str().to_lowercase()),
    })
}

/// Single line, collapsed whitespace, at most 280 chars.
pub fn sanitize_reasoning(input: &str) -> String {
    let mut out = String::with_capacity(input.len().min(MAX_REASONING_CHARS));
    let mut prev_space = false;
    let mut n = 0usize;
    for ch in input.chars() {
        let c = if ch.is_whitespace() || ch.is_control() {
            ' '
        } else {
            ch
        };
        if c == ' ' {
            if !prev_space && !out.is_empty() {
                out.push(' ');
                n += 1;
            }
            prev_space = true;
        } else {
            out.push(c);
            n += 1;
            prev_space = false;
        }
        if n >= MAX_REASONING_CHARS {
            break;
        }
    }
    out.trim().to_string()
}

// ------------------------------------------------------------
// Caching client wrapper (file cache + daily limit)
// ------------------------------------------------------------

/// Verdict files kept in the cache dir before the oldest are pruned.
pub const DEFAULT_MAX_CACHE_ENTRIES: usize = 10_000;

/// Cache hits never count against the daily budget; every attempted remote
/// call does, even when it fails or its content turns out unusable.
pub struct CachingClient<P: Provider> {
    inner: P,
    cache_dir: PathBuf,
    daily_limit_max: u32,
    max_cache_entries: usize,
    counter: Mutex<DailyCounter>,
}

impl<P: Provider> CachingClient<P> {
    pub fn new(inner: P, cache_dir: PathBuf, daily_limit_max: u32) -> Self {
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!(
                error = %e,
                dir = %cache_dir.display(),
                "AI cache dir not created; cache and budget will not persist"
            );
        }
        let counter = Mutex::new(load_daily_counter(&cache_dir).unwrap_or_default());
        Self {
            inner,
            cache_dir,
            daily_limit_max,
            max_cache_entries: DEFAULT_MAX_CACHE_ENTRIES,
            counter,
        }
    }

    /// Cap on cached verdict files; the oldest are removed past it.
    pub fn with_max_cache_entries(mut self, max: usize) -> Self {
        self.max_cache_entries = max;
        self
    }

    /// Real remote calls made today (diagnostics/tests).
    pub fn calls_today(&self) -> u32 {
        let g = self.counter.lock().expect("poisoned counter");
        if g.is_expired() {
            0
        } else {
            g.count
        }
    }

    /// Check and take one slot of today's budget under a single lock.
    fn reserve_call(&self) -> Result<(), RemoteFailure> {
        let mut g = self.counter.lock().expect("poisoned counter");
        if g.is_expired() {
            g.reset_to_today();
        }
        if g.count >= self.daily_limit_max {
            return Err(RemoteFailure::DailyLimit);
        }
        g.count = g.count.saturating_add(1);
        if let Err(e) = save_daily_counter(&self.cache_dir, &g) {
            warn!(error = %e, count = g.count, "daily counter not persisted");
        }
        Ok(())
    }
}

#[async_trait]
impl<P: Provider> RemoteScorer for CachingClient<P> {
    async fn score(&self, text: &str) -> Result<RemoteVerdict, RemoteFailure> {
        // 1) Cache lookup.
        let key = cache_key(self.inner.name(), text);
        if let Some(hit) = read_cache_file(&self.cache_dir, &key) {
            debug!(%key, provider = self.inner.name(), "remote verdict cache hit");
            return Ok(hit);
        }

        // 2) Daily budget: the slot is taken before the call.
        self.reserve_call()?;

        // 3) Real call.
        let content = self.inner.complete(text).await?;
        let verdict = parse_verdict(&content)?;
        if let Err(e) = write_cache_file(&self.cache_dir, &key, &verdict) {
            debug!(error = %e, "remote verdict cache write failed");
        } else {
            prune_cache(&self.cache_dir, self.max_cache_entries);
        }
        Ok(verdict)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

// ------------------------------------------------------------
// File cache helpers
// ------------------------------------------------------------

fn default_cache_dir() -> PathBuf {
    std::env::var("AI_CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("cache/ai"))
}

fn cache_key(provider: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(provider.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(32);
    for b in digest.iter().take(16) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn cache_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

fn read_cache_file(dir: &Path, key: &str) -> Option<RemoteVerdict> {
    let raw = fs::read_to_string(cache_path(dir, key)).ok()?;
    serde_json::from_str(&raw).ok()
}

fn write_cache_file(dir: &Path, key: &str, value: &RemoteVerdict) -> io::Result<()> {
    let path = cache_path(dir, key);
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(value)?;
    let mut f = fs::File::create(&tmp)?;
    f.write_all(json.as_bytes())?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Remove the oldest verdict files (by mtime) beyond `max`.
fn prune_cache(dir: &Path, max: usize) {
    let entries = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            debug!(error = %e, "AI cache dir not readable; prune skipped");
            return;
        }
    };
    let counter = counter_path(dir);
    let mut files: Vec<(std::time::SystemTime, PathBuf)> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|x| x == "json") && *p != counter)
        .filter_map(|p| {
            let mtime = fs::metadata(&p).and_then(|m| m.modified()).ok()?;
            Some((mtime, p))
        })
        .collect();
    if files.len() <= max {
        return;
    }
    files.sort();
    let excess = files.len() - max;
    for (_, p) in files.into_iter().take(excess) {
        match fs::remove_file(&p) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => debug!(error = %e, path = %p.display(), "AI cache prune failed"),
        }
    }
}

// ------------------------------------------------------------
// Daily counter helpers
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DailyCounter {
    date: String,
    count: u32,
}

impl Default for DailyCounter {
    fn default() -> Self {
        Self {
            date: today(),
            count: 0,
        }
    }
}

impl DailyCounter {
    fn is_expired(&self) -> bool {
        self.date != today()
    }
    fn reset_to_today(&mut self) {
        self.date = today();
        self.count = 0;
    }
}

/// UTC calendar day, e.g. "2025-03-14".
fn today() -> String {
    chrono::Utc::now().date_naive().to_string()
}

fn counter_path(dir: &Path) -> PathBuf {
    dir.join("daily_count.json")
}

fn load_daily_counter(dir: &Path) -> io::Result<DailyCounter> {
    let s = fs::read_to_string(counter_path(dir))?;
    let dc: DailyCounter =
        serde_json::from_str(&s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(dc)
}

fn save_daily_counter(dir: &Path, dc: &DailyCounter) -> io::Result<()> {
    let p = counter_path(dir);
    let tmp = p.with_extension("json.tmp");
    let s = serde_json::to_string(dc)?;
    let mut f = fs::File::create(&tmp)?;
    f.write_all(s.as_bytes())?;
    fs::rename(tmp, p)?;
    Ok(())
}
