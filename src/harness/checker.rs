//! Property checks over a [`Codec`].

use std::time::Instant;

use crate::config::HarnessConfig;
use crate::pipeline::sha256_hex;
use crate::Result;

use super::report::{CaseResult, Property, ValidationReport};
use super::{monotonicity_pairs, standard_corpus, Codec};

pub struct PropertyChecker<C: Codec> {
    codec: C,
    config: HarnessConfig,
}

/// What a single check produced before timing and naming are attached.
struct Outcome {
    passed: bool,
    detail: String,
    warning: Option<String>,
}

impl Outcome {
    fn pass_if(passed: bool, detail: String) -> Self {
        Self { passed, detail, warning: None }
    }
}

impl<C: Codec> PropertyChecker<C> {
    pub fn new(codec: C) -> Self {
        Self::with_config(codec, HarnessConfig::default())
    }

    pub fn with_config(codec: C, config: HarnessConfig) -> Self {
        Self { codec, config }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    fn run_case(
        &self,
        name: String,
        property: Property,
        input_len: usize,
        check: impl FnOnce() -> Result<Outcome>,
    ) -> CaseResult {
        let start = Instant::now();
        let outcome = check();
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let case = match outcome {
            Ok(o) => CaseResult {
                name,
                property,
                input_len,
                passed: o.passed,
                detail: Some(o.detail),
                warning: o.warning,
                error: None,
                elapsed_ms,
            },
            Err(e) => CaseResult {
                name,
                property,
                input_len,
                passed: false,
                detail: None,
                warning: None,
                error: Some(e.to_string()),
                elapsed_ms,
            },
        };
        if !case.passed {
            tracing::warn!(codec = self.codec.name(), case = %case.name, error = ?case.error, "property check failed");
        }
        case
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// `decompress(compress(t)) == t`.
    pub fn check_symmetry(&self, texts: &[String]) -> Vec<CaseResult> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                self.run_case(format!("symmetry_{}", i + 1), Property::Symmetry, text.chars().count(), || {
                    let restored = self.codec.decompress(&self.codec.compress(text)?)?;
                    let same = restored == *text;
                    Ok(Outcome::pass_if(
                        same,
                        format!(
                            "original {} chars, restored {} chars, match {same}",
                            text.chars().count(),
                            restored.chars().count()
                        ),
                    ))
                })
            })
            .collect()
    }

    /// Repeated compressions are byte-identical.
    pub fn check_determinism(&self, text: &str) -> CaseResult {
        let iterations = self.config.determinism_iterations;
        self.run_case("determinism".into(), Property::Determinism, text.chars().count(), || {
            let first = self.codec.compress(text)?;
            let mut same = true;
            for _ in 1..iterations {
                if self.codec.compress(text)? != first {
                    same = false;
                    break;
                }
            }
            Ok(Outcome::pass_if(same, format!("{iterations} iterations, all identical {same}")))
        })
    }

    /// Compressing the artifact (read byte-per-char as text) must fail or
    /// give a different artifact.
    pub fn check_idempotence(&self, text: &str) -> CaseResult {
        self.run_case("idempotence".into(), Property::Idempotence, text.chars().count(), || {
            let once = self.codec.compress(text)?;
            let as_text: String = once.iter().map(|&b| char::from(b)).collect();
            match self.codec.compress(&as_text) {
                Ok(twice) => {
                    let differs = twice != once;
                    Ok(Outcome::pass_if(
                        differs,
                        format!("once {} bytes, twice {} bytes, different {differs}", once.len(), twice.len()),
                    ))
                }
                Err(e) => Ok(Outcome::pass_if(true, format!("second compression rejected: {e}"))),
            }
        })
    }

    /// Advisory: a longer input should not give a smaller artifact.
    /// Violations are recorded as warnings, never as failures.
    pub fn check_monotonicity(&self, pairs: &[(String, String)]) -> Vec<CaseResult> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (short, long))| {
                self.run_case(
                    format!("monotonicity_{}", i + 1),
                    Property::Monotonicity,
                    long.chars().count(),
                    || {
                        let a = self.codec.compress(short)?.len();
                        let b = self.codec.compress(long)?.len();
                        let monotonic = b >= a;
                        Ok(Outcome {
                            passed: true,
                            detail: format!(
                                "short {}→{a} bytes, long {}→{b} bytes",
                                short.len(),
                                long.len()
                            ),
                            warning: (!monotonic).then(|| format!("longer input shrank by {} bytes", a - b)),
                        })
                    },
                )
            })
            .collect()
    }

    /// SHA-256 of the restored text equals SHA-256 of the input.
    pub fn check_integrity(&self, texts: &[String]) -> Vec<CaseResult> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                self.run_case(format!("integrity_{}", i + 1), Property::Integrity, text.chars().count(), || {
                    let expected = sha256_hex(text);
                    let actual = sha256_hex(&self.codec.decompress(&self.codec.compress(text)?)?);
                    let same = expected == actual;
                    Ok(Outcome::pass_if(
                        same,
                        format!("original {}…, restored {}…, match {same}", &expected[..16], &actual[..16]),
                    ))
                })
            })
            .collect()
    }

    // ========================================================================
    // Full run
    // ========================================================================

    /// Every property over `corpus`; determinism and idempotence use its
    /// first text.
    pub fn run(&self, corpus: &[String], pairs: &[(String, String)]) -> ValidationReport {
        let mut cases = self.check_symmetry(corpus);
        if let Some(first) = corpus.first() {
            cases.push(self.check_determinism(first));
            cases.push(self.check_idempotence(first));
        }
        cases.extend(self.check_monotonicity(pairs));
        cases.extend(self.check_integrity(corpus));

        let report = ValidationReport::from_cases(self.codec.name(), cases, &self.config);
        tracing::debug!(
            codec = self.codec.name(),
            passed = report.passed_cases,
            total = report.total_cases,
            classification = ?report.classification,
            "validation finished"
        );
        report
    }

    pub fn run_standard(&self) -> ValidationReport {
        self.run(&standard_corpus(), &monotonicity_pairs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{Classification, Guarantee, ReferenceCodec};
    use crate::Error;

    /// Compresses to a constant: deterministic but lossy.
    struct Constant;

    impl Codec for Constant {
        fn name(&self) -> &str {
            "constant"
        }
        fn compress(&self, _text: &str) -> Result<Vec<u8>> {
            Ok(vec![0; 4])
        }
        fn decompress(&self, _data: &[u8]) -> Result<String> {
            Ok(String::new())
        }
    }

    /// Shorter output for longer input.
    struct Shrinking;

    impl Codec for Shrinking {
        fn name(&self) -> &str {
            "shrinking"
        }
        fn compress(&self, text: &str) -> Result<Vec<u8>> {
            Ok(vec![0; 1000usize.saturating_sub(text.len())])
        }
        fn decompress(&self, _data: &[u8]) -> Result<String> {
            Err(Error::InvalidPayload("not invertible".into()))
        }
    }

    #[test]
    fn test_reference_codec_is_valid() {
        let report = PropertyChecker::new(ReferenceCodec).run_standard();
        assert_eq!(report.failed_cases, 0, "{:?}", report.failures().collect::<Vec<_>>());
        assert_eq!(report.classification, Classification::Valid);
        assert_eq!(report.guarantees.lossless, Guarantee::Yes);
        assert_eq!(report.guarantees.monotonic_soft, Guarantee::Yes);
    }

    #[test]
    fn test_lossy_codec_fails_symmetry() {
        let checker = PropertyChecker::new(Constant);
        let cases = checker.check_symmetry(&["abc".to_string()]);
        assert!(!cases[0].passed);
        // Constant output also breaks one-way-ness.
        assert!(!checker.check_idempotence("abc").passed);
        assert!(checker.check_determinism("abc").passed);
    }

    #[test]
    fn test_monotonicity_violation_is_only_a_warning() {
        let checker = PropertyChecker::new(Shrinking);
        let cases = checker.check_monotonicity(&monotonicity_pairs());
        assert!(cases.iter().all(|c| c.passed));
        assert!(cases.iter().all(|c| c.warning.is_some()));

        let report = checker.run_standard();
        assert_eq!(report.guarantees.monotonic_soft, Guarantee::Partial);
        assert_eq!(report.classification, Classification::NeedsRevision);
    }

    #[test]
    fn test_errors_are_captured() {
        let checker = PropertyChecker::new(Shrinking);
        let case = &checker.check_integrity(&["x".to_string()])[0];
        assert!(!case.passed);
        assert!(case.error.as_deref().unwrap().contains("not invertible"));
    }
}
