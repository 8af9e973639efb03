//! # Restitution Guide
//!
//! The guide is the binary delta stream that turns a regenerated draft
//! back into the exact original text.
//!
//! ```text
//! draft  "Le roi √jñā le royaume"
//!   │  Replace { pos: 7, old_len: 8, text: "conquiert" }
//!   │  Disambiguate { node_ref: n1, choice: 1 }
//!   ▼
//! text   "Le roi conquiert le royaume"
//! ```
//!
//! - [`codec`] — byte-exact wire format (`encode` / `decode`)
//! - [`apply`] — replay operations over a draft
//! - [`diff`]  — compute the operations reconciling a draft with a text

pub mod apply;
pub mod codec;
pub mod diff;

use serde::{Deserialize, Serialize};

use crate::model::SemanticNodeId;

pub use apply::{apply, apply_checked};
pub use codec::{decode, encode, DecodedGuide, GuideStop, GUIDE_VERSION, HEADER_LEN};
pub use diff::diff;

// ============================================================================
// Opcodes
// ============================================================================

/// Guide opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    // Text deltas
    Replace = 0x01,
    Insert = 0x02,
    Delete = 0x03,

    // Semantic patches
    Disambiguate = 0x10,
    Specify = 0x11,

    // Context markers (reserved)
    ContextStart = 0x20,
    ContextEnd = 0x21,
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Opcode::Replace),
            0x02 => Some(Opcode::Insert),
            0x03 => Some(Opcode::Delete),
            0x10 => Some(Opcode::Disambiguate),
            0x11 => Some(Opcode::Specify),
            0x20 => Some(Opcode::ContextStart),
            0x21 => Some(Opcode::ContextEnd),
            _ => None,
        }
    }

    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Replace => "REPLACE",
            Opcode::Insert => "INSERT",
            Opcode::Delete => "DELETE",
            Opcode::Disambiguate => "DISAMBIGUATE",
            Opcode::Specify => "SPECIFY",
            Opcode::ContextStart => "CONTEXT_START",
            Opcode::ContextEnd => "CONTEXT_END",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Operations
// ============================================================================

/// One restitution operation.
///
/// Positions and lengths are byte offsets into the text as patched by the
/// preceding operations. Fields are wider than their wire encoding; values
/// that do not fit are rejected by [`encode`], never truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideOperation {
    Replace { pos: usize, old_len: usize, text: String },
    Insert { pos: usize, text: String },
    Delete { pos: usize, len: usize },
    /// Select sense `choice` for the concept behind `node_ref`.
    Disambiguate { node_ref: SemanticNodeId, choice: u8 },
    /// Attach a textual specification to a node.
    Specify { node_ref: SemanticNodeId, text: String },
    ContextStart,
    ContextEnd,
}

impl GuideOperation {
    pub fn opcode(&self) -> Opcode {
        match self {
            GuideOperation::Replace { .. } => Opcode::Replace,
            GuideOperation::Insert { .. } => Opcode::Insert,
            GuideOperation::Delete { .. } => Opcode::Delete,
            GuideOperation::Disambiguate { .. } => Opcode::Disambiguate,
            GuideOperation::Specify { .. } => Opcode::Specify,
            GuideOperation::ContextStart => Opcode::ContextStart,
            GuideOperation::ContextEnd => Opcode::ContextEnd,
        }
    }

    /// Byte position of a text edit; `None` for node patches and markers.
    pub fn position(&self) -> Option<usize> {
        match self {
            GuideOperation::Replace { pos, .. }
            | GuideOperation::Insert { pos, .. }
            | GuideOperation::Delete { pos, .. } => Some(*pos),
            _ => None,
        }
    }

    /// Text carried by the record, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            GuideOperation::Replace { text, .. }
            | GuideOperation::Insert { text, .. }
            | GuideOperation::Specify { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Size of the encoded record in bytes.
    pub fn encoded_len(&self) -> usize {
        match self {
            GuideOperation::Replace { text, .. } => 1 + 2 + 1 + text.len() + 1,
            GuideOperation::Insert { text, .. } => 1 + 2 + text.len() + 1,
            GuideOperation::Delete { .. } => 4,
            GuideOperation::Disambiguate { .. } => 4,
            GuideOperation::Specify { text, .. } => 1 + 2 + text.len() + 1,
            GuideOperation::ContextStart | GuideOperation::ContextEnd => 1,
        }
    }
}
