//! Static word tables shared by both scorers.
//!
//! The polarity lists are plain membership tests (±1). The graded table maps a
//! word to a signed weight in [-0.8, 0.8] and is embedded from
//! `data/intensity_lexicon.json` at compile time, parsed once on first use.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "amazing",
    "wonderful",
    "fantastic",
    "love",
    "like",
    "best",
    "awesome",
    "perfect",
    "happy",
    "satisfied",
    "pleased",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "horrible",
    "hate",
    "dislike",
    "worst",
    "poor",
    "disappointed",
    "angry",
    "frustrated",
    "sad",
    "unhappy",
];

static INTENSITY: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../../data/intensity_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid intensity lexicon")
});

#[inline]
pub fn is_positive(word: &str) -> bool {
    POSITIVE_WORDS.contains(&word)
}

#[inline]
pub fn is_negative(word: &str) -> bool {
    NEGATIVE_WORDS.contains(&word)
}

/// Graded weight for a (lower-cased) word; 0.0 if the word is unknown.
#[inline]
pub fn intensity_weight(word: &str) -> f64 {
    INTENSITY.get(word).copied().unwrap_or(0.0)
}

/// Amplifies the following token.
pub fn is_intensifier(tok: &str) -> bool {
    matches!(
        tok,
        "very" | "really" | "extremely" | "incredibly" | "absolutely"
    )
}

/// Flips the sign of the following token.
pub fn is_negation(tok: &str) -> bool {
    matches!(
        tok,
        "not" | "no" | "never" | "nothing" | "nowhere" | "neither" | "nobody" | "none"
    )
}
