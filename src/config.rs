//! Codec configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! { "pipeline": { "language": "en", "draft": "lexicalize" } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::guide::GUIDE_VERSION;
use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub pipeline: PipelineConfig,
    pub similarity: SimilarityConfig,
    pub harness: HarnessConfig,
}

/// How the draft is regenerated from a semantic payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStrategy {
    /// Unit values joined by single spaces.
    #[default]
    Concat,
    /// Concept units rendered through their lexicalization.
    Lexicalize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Language recorded when the caller does not name one.
    pub language: String,
    pub draft: DraftStrategy,
    /// Longest phrase, in tokens, the analyzer tries to match.
    pub max_phrase_tokens: usize,
    pub guide_version: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            language: "fr".to_string(),
            draft: DraftStrategy::Concat,
            max_phrase_tokens: 4,
            guide_version: GUIDE_VERSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub top_k: usize,
    pub threshold: f32,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self { top_k: 5, threshold: 0.7 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub determinism_iterations: usize,
    /// Success rate (percent) at or above which a codec is `Valid`.
    pub valid_threshold: f64,
    /// Success rate (percent) at or above which a codec is `MvpAcceptable`.
    pub mvp_threshold: f64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            determinism_iterations: 10,
            valid_threshold: 90.0,
            mvp_threshold: 75.0,
        }
    }
}

impl CodecConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading codec config");
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.pipeline;
        if p.language.trim().is_empty() {
            return Err(Error::Config("pipeline.language must not be empty".into()));
        }
        if p.max_phrase_tokens == 0 {
            return Err(Error::Config("pipeline.max_phrase_tokens must be at least 1".into()));
        }
        if p.guide_version != GUIDE_VERSION {
            return Err(Error::Config(format!(
                "pipeline.guide_version {} is not supported (expected {GUIDE_VERSION})",
                p.guide_version
            )));
        }

        let s = &self.similarity;
        if !(-1.0..=1.0).contains(&s.threshold) {
            return Err(Error::Config(format!(
                "similarity.threshold {} outside [-1, 1]",
                s.threshold
            )));
        }

        let h = &self.harness;
        if h.determinism_iterations < 2 {
            return Err(Error::Config("harness.determinism_iterations must be at least 2".into()));
        }
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(h.valid_threshold) || !in_range(h.mvp_threshold) || h.mvp_threshold > h.valid_threshold {
            return Err(Error::Config(format!(
                "harness thresholds must satisfy 0 <= mvp ({}) <= valid ({}) <= 100",
                h.mvp_threshold, h.valid_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        let config = CodecConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.language, "fr");
        assert_eq!(config.similarity.top_k, 5);
        assert_eq!(config.harness.determinism_iterations, 10);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CodecConfig::from_json_str(
            r#"{ "pipeline": { "language": "en", "draft": "lexicalize" } }"#,
        )
        .unwrap();
        assert_eq!(config.pipeline.language, "en");
        assert_eq!(config.pipeline.draft, DraftStrategy::Lexicalize);
        assert_eq!(config.pipeline.max_phrase_tokens, 4);
        assert_eq!(config.harness, HarnessConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for json in [
            r#"{ "pipeline": { "max_phrase_tokens": 0 } }"#,
            r#"{ "pipeline": { "guide_version": 9 } }"#,
            r#"{ "similarity": { "threshold": 1.5 } }"#,
            r#"{ "harness": { "valid_threshold": 60.0, "mvp_threshold": 80.0 } }"#,
            r#"{ "harness": { "determinism_iterations": 1 } }"#,
        ] {
            assert!(
                matches!(CodecConfig::from_json_str(json), Err(Error::Config(_))),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn test_malformed_json_is_a_json_error() {
        assert!(matches!(CodecConfig::from_json_str("{"), Err(Error::Json(_))));
    }
}
