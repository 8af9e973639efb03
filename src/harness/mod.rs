//! # Validation Harness
//!
//! Checks the codec contract over any byte-level [`Codec`]:
//!
//! | Property     | Rule                                                   |
//! |--------------|--------------------------------------------------------|
//! | symmetry     | `decompress(compress(t)) == t`                         |
//! | determinism  | N compressions of `t` are byte-identical               |
//! | idempotence  | compressing the artifact bytes fails or differs        |
//! | monotonicity | longer input tends to a larger artifact (advisory)     |
//! | integrity    | SHA-256 of the output equals SHA-256 of the input      |
//!
//! Results aggregate into a [`ValidationReport`] with a [`Classification`].

pub mod checker;
pub mod corpus;
pub mod report;

use sha2::{Digest, Sha256};

use crate::pipeline::{Artifact, SemanticCodec};
use crate::{Error, Result};

pub use checker::PropertyChecker;
pub use corpus::{monotonicity_pairs, standard_corpus};
pub use report::{CaseResult, Classification, Guarantee, Guarantees, Property, PropertySummary, ValidationReport};

/// A text codec seen as opaque bytes.
pub trait Codec {
    fn name(&self) -> &str;
    fn compress(&self, text: &str) -> Result<Vec<u8>>;
    fn decompress(&self, data: &[u8]) -> Result<String>;
}

impl Codec for SemanticCodec {
    fn name(&self) -> &str {
        "semantic"
    }

    fn compress(&self, text: &str) -> Result<Vec<u8>> {
        SemanticCodec::compress(self, text)?.to_bytes()
    }

    fn decompress(&self, data: &[u8]) -> Result<String> {
        SemanticCodec::decompress(self, &Artifact::from_bytes(data)?)
    }
}

// ============================================================================
// ReferenceCodec
// ============================================================================

const FINGERPRINT_LEN: usize = 16;

/// Baseline codec: `[sha256(text)[..16]][utf-8 text]`.
///
/// Trivially symmetric; used to check the harness itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceCodec;

fn fingerprint(text: &str) -> [u8; FINGERPRINT_LEN] {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = [0u8; FINGERPRINT_LEN];
    out.copy_from_slice(&digest[..FINGERPRINT_LEN]);
    out
}

impl Codec for ReferenceCodec {
    fn name(&self) -> &str {
        "reference"
    }

    fn compress(&self, text: &str) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(FINGERPRINT_LEN + text.len());
        out.extend_from_slice(&fingerprint(text));
        out.extend_from_slice(text.as_bytes());
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<String> {
        if data.len() < FINGERPRINT_LEN {
            return Err(Error::InvalidPayload(format!(
                "reference artifact needs {FINGERPRINT_LEN} bytes, got {}",
                data.len()
            )));
        }
        let (expected, body) = data.split_at(FINGERPRINT_LEN);
        let text = std::str::from_utf8(body)
            .map_err(|e| Error::InvalidPayload(format!("reference body is not UTF-8: {e}")))?;
        let actual = fingerprint(text);
        if expected != actual.as_slice() {
            return Err(Error::IntegrityMismatch {
                expected: hex::encode(expected),
                actual: hex::encode(actual),
            });
        }
        Ok(text.to_string())
    }
}
