//! # Compression Pipeline
//!
//! ```text
//! compress:
//!   text ──analyze──▶ SemanticRepresentation ──generate──▶ draft
//!     │                      │                               │
//!     │                      ▼                               ▼
//!     │                 payload (JSON)          diff(draft, text) ──▶ guide
//!     └──────────────────────────────── sha256 ──▶ original_hash
//!
//! decompress:
//!   payload ──parse──▶ repr ──generate──▶ draft ──apply(guide)──▶ text
//!                                                   └── sha256 == original_hash
//! ```
//!
//! The guide is computed against the draft alone, so any deterministic
//! [`DraftGenerator`] and any [`Analyzer`] give a lossless round trip as
//! long as both sides use the same generator.

pub mod analyzer;
pub mod compressor;
pub mod draft;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use analyzer::{append_verbatim, tokenize, Analyzer, GreedyAnalyzer, Token};
pub use compressor::{Compressor, Decompressor, SemanticCodec};
pub use draft::{ConcatDraft, DraftGenerator, LexicalizingDraft};

/// Lowercase hex SHA-256 of `text`.
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

// ============================================================================
// Artifact
// ============================================================================

/// Compressed output for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub source_language: String,
    /// Serialized [`SemanticRepresentation`](crate::SemanticRepresentation).
    pub semantic_payload: String,
    /// Encoded guide; hex in JSON transport.
    #[serde(with = "crate::export::hex_bytes")]
    pub guide: Vec<u8>,
    /// Hex SHA-256 of the original text.
    pub original_hash: String,
    pub stats: CompressionStats,
}

/// Sizes in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressionStats {
    pub original_size: usize,
    pub semantic_size: usize,
    pub guide_size: usize,
    pub total_size: usize,
    /// `total / original`; `None` for empty input.
    pub ratio: Option<f64>,
    /// `(1 - ratio) * 100`, two decimals. Negative when the artifact is
    /// larger than the text.
    pub savings_percent: Option<f64>,
}

impl CompressionStats {
    pub fn new(original_size: usize, semantic_size: usize, guide_size: usize) -> Self {
        let total_size = semantic_size + guide_size;
        let ratio = (original_size > 0).then(|| total_size as f64 / original_size as f64);
        let savings_percent = ratio.map(|r| ((1.0 - r) * 100.0 * 100.0).round() / 100.0);
        Self {
            original_size,
            semantic_size,
            guide_size,
            total_size,
            ratio,
            savings_percent,
        }
    }
}
