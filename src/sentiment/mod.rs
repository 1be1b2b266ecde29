//! # Sentiment core
//! Pure scoring pipeline: text → tokens → {polarity, intensity} → blended verdict.
//! No I/O and no shared mutable state; the word tables are read-only statics.

pub mod blend;
pub mod intensity;
pub mod lexicon;
pub mod polarity;
pub mod tokenize;

use serde::{Deserialize, Serialize};

pub use blend::{blend, BlendedResult, LOCAL_METHOD};
pub use intensity::{score_intensity, IntensityResult};
pub use polarity::{score_polarity, PolarityResult};
pub use tokenize::tokenize;

/// Three-way verdict shared by every scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// `Positive` above `+t`, `Negative` below `-t`, otherwise `Neutral`.
    pub fn from_score_strict(score: f64, t: f64) -> Self {
        if score > t {
            Sentiment::Positive
        } else if score < -t {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    /// Like [`Sentiment::from_score_strict`] but the boundary itself counts.
    pub fn from_score_inclusive(score: f64, t: f64) -> Self {
        if score >= t {
            Sentiment::Positive
        } else if score <= -t {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    /// Case-insensitive label parse ("positive", "NEGATIVE", " Neutral ").
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

/// Tunable constants of the pipeline. `Default` is the production contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    /// Multiplier applied to hits-per-token before clamping.
    pub polarity_scale: f64,
    pub polarity_threshold: f64,
    pub intensity_threshold: f64,
    pub intensifier_multiplier: f64,
    pub polarity_weight: f64,
    pub intensity_weight: f64,
    pub blend_threshold: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            polarity_scale: 10.0,
            polarity_threshold: 0.1,
            intensity_threshold: 0.05,
            intensifier_multiplier: 1.5,
            polarity_weight: 0.4,
            intensity_weight: 0.6,
            blend_threshold: 0.1,
        }
    }
}

/// Full diagnostic output of one analysis. Wire names match what the
/// dashboard already consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    #[serde(rename = "message")]
    pub text: String,
    #[serde(rename = "textblob")]
    pub polarity: PolarityResult,
    #[serde(rename = "vader")]
    pub intensity: IntensityResult,
    #[serde(rename = "final")]
    pub blended: BlendedResult,
}

/// Holds the parameter set; cheap to clone and share behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer {
    params: ScoringParams,
}

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: ScoringParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ScoringParams {
        &self.params
    }

    pub fn analyze(&self, text: &str) -> SentimentReport {
        analyze_with(text, &self.params)
    }
}

/// Run the pipeline with default parameters.
pub fn analyze(text: &str) -> SentimentReport {
    analyze_with(text, &ScoringParams::default())
}

pub fn analyze_with(text: &str, params: &ScoringParams) -> SentimentReport {
    let tokens = tokenize(text);
    let polarity = score_polarity(&tokens, params);
    let intensity = score_intensity(&tokens, params);
    let blended = blend(&polarity, &intensity, params);
    SentimentReport {
        text: text.to_string(),
        polarity,
        intensity,
        blended,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_and_inclusive_differ_only_on_the_boundary() {
        assert_eq!(Sentiment::from_score_strict(0.1, 0.1), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score_inclusive(0.05, 0.05), Sentiment::Positive);
        assert_eq!(Sentiment::from_score_inclusive(-0.05, 0.05), Sentiment::Negative);
        assert_eq!(Sentiment::from_score_strict(-0.11, 0.1), Sentiment::Negative);
    }

    #[test]
    fn label_parse_is_case_insensitive() {
        assert_eq!(Sentiment::from_label(" POSITIVE "), Some(Sentiment::Positive));
        assert_eq!(Sentiment::from_label("negative"), Some(Sentiment::Negative));
        assert_eq!(Sentiment::from_label("mixed"), None);
    }

    #[test]
    fn report_serializes_with_dashboard_keys() {
        let v = serde_json::to_value(analyze("good")).unwrap();
        assert_eq!(v["message"], "good");
        assert_eq!(v["final"]["sentiment"], "Positive");
        assert!(v["textblob"]["polarity"].is_number());
        assert!(v["vader"]["compound"].is_number());
    }

    #[test]
    fn analyzer_uses_its_params() {
        let quiet = SentimentAnalyzer::with_params(ScoringParams {
            blend_threshold: 0.99,
            ..ScoringParams::default()
        });
        let r = quiet.analyze("This product is excellent and amazing");
        assert_eq!(r.blended.sentiment, Sentiment::Neutral);
        assert_eq!(
            SentimentAnalyzer::new().analyze("This product is excellent and amazing").blended.sentiment,
            Sentiment::Positive
        );
    }
}
