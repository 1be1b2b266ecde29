//! feedback.rs — in-memory feedback log: scored submissions keyed by id + timestamp.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sentiment::{BlendedResult, Sentiment};

pub const DEFAULT_STORE_CAP: usize = 5_000;
const MAX_STORE_CAP: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: u64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub sentiment: Sentiment,
    pub score: f64,
    pub confidence: f64,
    pub method: String,
    pub created_at: DateTime<Utc>,
}

/// Capped, thread-safe log. The oldest records are dropped past `cap`.
#[derive(Debug)]
pub struct FeedbackStore {
    inner: Mutex<Inner>,
    cap: usize,
}

#[derive(Debug)]
struct Inner {
    next_id: u64,
    rows: VecDeque<FeedbackRecord>,
}

impl Default for FeedbackStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_STORE_CAP)
    }
}

impl FeedbackStore {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_STORE_CAP);
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                rows: VecDeque::with_capacity(cap.min(1024)),
            }),
            cap,
        }
    }

    /// Capacity from `$FEEDBACK_STORE_CAP`, else the default.
    pub fn from_env() -> Self {
        let cap = std::env::var("FEEDBACK_STORE_CAP")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_STORE_CAP);
        Self::with_capacity(cap)
    }

    pub fn record(
        &self,
        text: &str,
        category: Option<String>,
        result: &BlendedResult,
    ) -> FeedbackRecord {
        self.record_at(text, category, result, Utc::now())
    }

    /// Same as [`FeedbackStore::record`] with an explicit timestamp.
    pub fn record_at(
        &self,
        text: &str,
        category: Option<String>,
        result: &BlendedResult,
        created_at: DateTime<Utc>,
    ) -> FeedbackRecord {
        let mut g = self.inner.lock().expect("feedback store mutex poisoned");
        let rec = FeedbackRecord {
            id: g.next_id,
            text: text.to_string(),
            category: normalize_category(category),
            sentiment: result.sentiment,
            score: result.score,
            confidence: result.confidence,
            method: result.method.clone(),
            created_at,
        };
        g.next_id += 1;
        g.rows.push_back(rec.clone());
        while g.rows.len() > self.cap {
            g.rows.pop_front();
        }
        rec
    }

    /// Newest first, at most `limit` records.
    pub fn list(&self, limit: Option<usize>) -> Vec<FeedbackRecord> {
        let g = self.inner.lock().expect("feedback store mutex poisoned");
        g.rows
            .iter()
            .rev()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> Vec<FeedbackRecord> {
        let g = self.inner.lock().expect("feedback store mutex poisoned");
        g.rows.iter().cloned().collect()
    }

    /// `true` if a record with `id` existed.
    pub fn delete(&self, id: u64) -> bool {
        let mut g = self.inner.lock().expect("feedback store mutex poisoned");
        match g.rows.iter().position(|r| r.id == id) {
            Some(pos) => {
                g.rows.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("feedback store mutex poisoned")
            .rows
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trimmed; blank means uncategorized.
fn normalize_category(c: Option<String>) -> Option<String> {
    c.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
