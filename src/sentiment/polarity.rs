//! Bag-of-words polarity ("TextBlob-like").
//!
//! Each positive hit adds +1, each negative hit −1. The raw count is divided by
//! the token count and scaled, because sentiment words are sparse in short
//! feedback and the plain ratio would almost always land near zero.

use serde::{Deserialize, Serialize};

use super::lexicon::{is_negative, is_positive};
use super::{ScoringParams, Sentiment};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarityResult {
    pub polarity: f64,
    pub sentiment: Sentiment,
    pub confidence: f64,
}

pub fn score_polarity<T: AsRef<str>>(tokens: &[T], params: &ScoringParams) -> PolarityResult {
    let raw: i64 = tokens
        .iter()
        .map(|t| {
            let w = t.as_ref();
            i64::from(is_positive(w)) - i64::from(is_negative(w))
        })
        .sum();

    let polarity = if tokens.is_empty() {
        0.0
    } else {
        (raw as f64 / tokens.len() as f64 * params.polarity_scale).clamp(-1.0, 1.0)
    };

    PolarityResult {
        polarity,
        sentiment: Sentiment::from_score_strict(polarity, params.polarity_threshold),
        confidence: polarity.abs(),
    }
}
