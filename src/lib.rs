//! # dhatu-codec — Semantic Compression Codec
//!
//! Compresses a text into a semantic representation (ordered units plus a
//! relation graph over lexicon roots) and a compact binary **guide** that
//! restores the byte-exact original from a regenerated draft.
//!
//! ## Design Principles
//!
//! 1. **Lossless by construction**: the guide is the diff between the
//!    regenerated draft and the original, so any deterministic analyzer and
//!    draft generator round-trip exactly
//! 2. **Clean DTOs**: `SemanticRepresentation`, `GuideOperation`, `Artifact`
//!    cross all boundaries
//! 3. **Frozen lexicon**: the `ConceptGraph` is built once and shared behind
//!    an `Arc`; runtime updates swap whole snapshots
//! 4. **One wire format**: the guide bytecode is the only byte-exact interface
//!
//! ## Quick Start
//!
//! ```rust
//! use dhatu_codec::SemanticCodec;
//!
//! # fn example() -> dhatu_codec::Result<()> {
//! let codec = SemanticCodec::builtin()?;
//! let artifact = codec.compress("Le roi conquiert le royaume")?;
//! assert_eq!(codec.decompress(&artifact)?, "Le roi conquiert le royaume");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | Semantic units, graph, representation |
//! | [`lexicon`] | Concept graph of roots, similarity, language functions |
//! | [`guide`] | Guide bytecode, diff and apply |
//! | [`pipeline`] | Compressor / Decompressor, artifacts |
//! | [`export`] | Artifact transport |
//! | [`harness`] | Codec property validation |
//! | [`config`] | Codec configuration |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod lexicon;
pub mod guide;
pub mod pipeline;
pub mod export;
pub mod harness;
pub mod config;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    SemanticUnit, UnitId, UnitType,
    SemanticNode, SemanticNodeId, SemanticEdge, RelationType,
    SemanticGraph, SemanticRepresentation, MetaValue, Metadata,
};

// ============================================================================
// Re-exports: Lexicon
// ============================================================================

pub use lexicon::{ConceptGraph, ConceptId, ConceptNode, SharedLexicon};

// ============================================================================
// Re-exports: Guide
// ============================================================================

pub use guide::{GuideOperation, Opcode, GuideStop, DecodedGuide, GUIDE_VERSION};

// ============================================================================
// Re-exports: Pipeline
// ============================================================================

pub use pipeline::{
    Artifact, CompressionStats, Compressor, Decompressor, SemanticCodec,
    Analyzer, GreedyAnalyzer, DraftGenerator, ConcatDraft, LexicalizingDraft,
};

// ============================================================================
// Re-exports: Harness & Config
// ============================================================================

pub use harness::{Codec, ReferenceCodec, PropertyChecker, ValidationReport, Classification};
pub use config::CodecConfig;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Corrupt guide at byte {offset}: {reason} ({} operations recovered)", .recovered.len())]
    CorruptGuide {
        offset: usize,
        reason: String,
        recovered: Vec<GuideOperation>,
    },

    #[error("Integrity mismatch: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("Field overflow: {field} = {value} exceeds {max}")]
    FieldOverflow {
        field: &'static str,
        value: usize,
        max: usize,
    },

    #[error("Text of a {opcode} record contains the NUL terminator")]
    EmbeddedNul { opcode: &'static str },

    #[error("Guide operation {index} cannot be applied: {reason}")]
    GuideApplication { index: usize, reason: String },

    #[error("Unit {unit} has no graph node")]
    MissingGraphNode { unit: UnitId },

    #[error("Unknown unit: {0}")]
    UnknownUnit(UnitId),

    #[error("Separator of unit {unit} is not whitespace")]
    InvalidSeparator { unit: UnitId },

    #[error("Non-finite number in {0}")]
    NonFinite(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Duplicate concept: {0}")]
    DuplicateConcept(ConceptId),

    #[error("Unknown concept: {0}")]
    UnknownConceptRef(ConceptId),

    #[error("Unsupported lexicon version {found} (supported: {supported})")]
    UnsupportedLexiconVersion { found: u32, supported: u32 },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
