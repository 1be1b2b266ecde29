use serde::{Deserialize, Serialize};

use super::{IntensityResult, PolarityResult, ScoringParams, Sentiment};

/// Provenance string for results produced by the local pipeline.
pub const LOCAL_METHOD: &str = "Combined TextBlob + VADER";

/// Final verdict returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendedResult {
    pub score: f64,
    pub sentiment: Sentiment,
    /// Always `|score|`.
    pub confidence: f64,
    pub method: String,
    /// Free-text explanation; only remote scorers fill this in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl BlendedResult {
    /// Build a result whose label and confidence derive from `score`.
    pub fn from_score(score: f64, threshold: f64, method: impl Into<String>) -> Self {
        let score = score.clamp(-1.0, 1.0);
        Self {
            score,
            sentiment: Sentiment::from_score_strict(score, threshold),
            confidence: score.abs(),
            method: method.into(),
            reasoning: None,
        }
    }
}

/// Weighted average of the two scorers; the intensity model gets the larger
/// weight since it sees negation and intensifiers.
pub fn blend(
    polarity: &PolarityResult,
    intensity: &IntensityResult,
    params: &ScoringParams,
) -> BlendedResult {
    let score =
        polarity.polarity * params.polarity_weight + intensity.compound * params.intensity_weight;
    BlendedResult::from_score(score, params.blend_threshold, LOCAL_METHOD)
}
