//! File-backed configuration: remote scorer (`config/ai.json`) and scoring
//! parameters (`config/scoring.toml`).

pub mod ai;
pub mod scoring;
