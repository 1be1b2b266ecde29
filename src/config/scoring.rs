//! Scoring parameters from `config/scoring.toml`.
//!
//! Every key is optional. Values that are not finite or fall outside their
//! sane range are replaced by the default for that key.

use anyhow::Context;
use std::{env, fs, path::Path};
use tracing::{debug, warn};

use crate::sentiment::ScoringParams;

pub const DEFAULT_SCORING_CONFIG_PATH: &str = "config/scoring.toml";
pub const ENV_SCORING_CONFIG_PATH: &str = "SCORING_CONFIG_PATH";

pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<ScoringParams> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading scoring params from {}", path.display()))?;
    let parsed: ScoringParams =
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(sanitize(parsed))
}

/// `$SCORING_CONFIG_PATH` or `config/scoring.toml`; falls back to defaults.
pub fn load_or_default() -> ScoringParams {
    let path =
        env::var(ENV_SCORING_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_SCORING_CONFIG_PATH.into());
    if !Path::new(&path).exists() {
        debug!(%path, "no scoring config; using defaults");
        return ScoringParams::default();
    }
    match load_from_file(&path) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = ?e, %path, "scoring config unusable; using defaults");
            ScoringParams::default()
        }
    }
}

fn sanitize(mut p: ScoringParams) -> ScoringParams {
    let d = ScoringParams::default();
    let fix = |v: &mut f64, dv: f64, ok: fn(f64) -> bool, key: &str| {
        if !v.is_finite() || !ok(*v) {
            warn!(key, value = *v, "invalid scoring param; using default");
            *v = dv;
        }
    };
    let unit = |v: f64| (0.0..=1.0).contains(&v);
    let non_neg = |v: f64| v >= 0.0;
    let positive = |v: f64| v > 0.0;

    fix(&mut p.polarity_scale, d.polarity_scale, positive, "polarity_scale");
    fix(&mut p.polarity_threshold, d.polarity_threshold, unit, "polarity_threshold");
    fix(&mut p.intensity_threshold, d.intensity_threshold, unit, "intensity_threshold");
    fix(
        &mut p.intensifier_multiplier,
        d.intensifier_multiplier,
        non_neg,
        "intensifier_multiplier",
    );
    fix(&mut p.polarity_weight, d.polarity_weight, non_neg, "polarity_weight");
    fix(&mut p.intensity_weight, d.intensity_weight, non_neg, "intensity_weight");
    fix(&mut p.blend_threshold, d.blend_threshold, unit, "blend_threshold");
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_config_matches_defaults() {
        let p = load_from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/config/scoring.toml"))
            .unwrap();
        assert_eq!(p, ScoringParams::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("scoring.toml");
        fs::write(&f, "blend_threshold = 0.2\n").unwrap();
        let p = load_from_file(&f).unwrap();
        assert_eq!(p.blend_threshold, 0.2);
        assert_eq!(p.polarity_weight, 0.4);
        assert_eq!(p.intensity_weight, 0.6);
    }

    #[test]
    fn out_of_range_values_are_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("scoring.toml");
        fs::write(&f, "polarity_threshold = 4.0\npolarity_weight = -1.0\npolarity_scale = 0.0\n")
            .unwrap();
        let p = load_from_file(&f).unwrap();
        assert_eq!(p, ScoringParams::default());
    }

    #[serial_test::serial]
    #[test]
    fn env_path_wins_and_missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("custom.toml");
        fs::write(&f, "intensifier_multiplier = 2.0\n").unwrap();

        env::set_var(ENV_SCORING_CONFIG_PATH, f.display().to_string());
        assert_eq!(load_or_default().intensifier_multiplier, 2.0);

        env::set_var(ENV_SCORING_CONFIG_PATH, dir.path().join("absent.toml"));
        assert_eq!(load_or_default(), ScoringParams::default());
        env::remove_var(ENV_SCORING_CONFIG_PATH);
    }
}
