//! Graded intensity model ("VADER-like").
//!
//! Per token: graded weight, then one look-back modifier from the previous
//! token (intensifier scales, negation flips). The summed compound is divided
//! by `sqrt(token_count)` so longer feedback is not louder just for being long.

use serde::{Deserialize, Serialize};

use super::lexicon::{intensity_weight, is_intensifier, is_negation};
use super::{ScoringParams, Sentiment};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityResult {
    /// Length-normalized compound in [-1, 1].
    pub compound: f64,
    /// Share of positive mass; the three shares sum to 1.0 or are all 0.
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub sentiment: Sentiment,
}

/// Weight of token `i` after applying the modifier carried by token `i - 1`.
pub fn token_score<T: AsRef<str>>(tokens: &[T], i: usize, params: &ScoringParams) -> f64 {
    let base = intensity_weight(tokens[i].as_ref());
    let Some(prev) = i.checked_sub(1).map(|p| tokens[p].as_ref()) else {
        return base;
    };
    if is_intensifier(prev) {
        base * params.intensifier_multiplier
    } else if is_negation(prev) {
        -base
    } else {
        base
    }
}

pub fn score_intensity<T: AsRef<str>>(tokens: &[T], params: &ScoringParams) -> IntensityResult {
    let mut compound = 0.0f64;
    let mut positive = 0.0f64;
    let mut negative = 0.0f64;
    let mut neutral = 0.0f64;

    for i in 0..tokens.len() {
        let s = token_score(tokens, i, params);
        compound += s;
        if s > 0.0 {
            positive += s;
        } else if s < 0.0 {
            negative += s.abs();
        } else {
            neutral += 1.0;
        }
    }

    let compound = if tokens.is_empty() {
        0.0
    } else {
        (compound / (tokens.len() as f64).sqrt()).clamp(-1.0, 1.0)
    };

    let total = positive + negative + neutral;
    let share = |x: f64| if total > 0.0 { x / total } else { 0.0 };

    IntensityResult {
        compound,
        positive: share(positive),
        negative: share(negative),
        neutral: share(neutral),
        sentiment: Sentiment::from_score_inclusive(compound, params.intensity_threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(tokens: &[&str]) -> IntensityResult {
        score_intensity(tokens, &ScoringParams::default())
    }

    #[test]
    fn empty_has_no_mass() {
        let r = score(&[]);
        assert_eq!(r.compound, 0.0);
        assert_eq!((r.positive, r.negative, r.neutral), (0.0, 0.0, 0.0));
        assert_eq!(r.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn first_token_is_never_modified() {
        let p = ScoringParams::default();
        assert_eq!(token_score(&["good", "not"], 0, &p), 0.4);
        assert_eq!(token_score(&["very"], 0, &p), 0.0);
    }

    #[test]
    fn negation_flips_and_intensifier_scales() {
        let p = ScoringParams::default();
        assert!((token_score(&["not", "good"], 1, &p) + 0.4).abs() < 1e-12);
        assert!((token_score(&["very", "good"], 1, &p) - 0.6).abs() < 1e-12);
        // only the immediately preceding token counts
        assert_eq!(token_score(&["not", "really", "bad"], 2, &p), -0.5 * 1.5);
    }

    #[test]
    fn proportions_split_mass_and_sum_to_one() {
        // good(0.4) + terrible(-0.8) + two neutral tokens
        let r = score(&["good", "and", "terrible", "box"]);
        let total = 0.4 + 0.8 + 2.0;
        assert!((r.positive - 0.4 / total).abs() < 1e-12);
        assert!((r.negative - 0.8 / total).abs() < 1e-12);
        assert!((r.neutral - 2.0 / total).abs() < 1e-12);
        assert!((r.positive + r.negative + r.neutral - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sqrt_normalization_and_clamp() {
        let r = score(&["this", "is", "terrible", "and", "awful"]);
        assert!((r.compound - (-1.5 / 5f64.sqrt())).abs() < 1e-12);
        assert_eq!(r.sentiment, Sentiment::Negative);

        let loud = vec!["excellent"; 50];
        assert_eq!(score(&loud).compound, 1.0);
    }

    #[test]
    fn threshold_is_inclusive() {
        // slow = -0.2 over 16 tokens → -0.2 / 4 = -0.05
        let mut toks = vec!["filler"; 15];
        toks.push("slow");
        let r = score(&toks);
        assert!((r.compound + 0.05).abs() < 1e-12);
        assert_eq!(r.sentiment, Sentiment::Negative);
    }
}
