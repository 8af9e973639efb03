//! Semantic unit — one atomic item of the ordered representation.

use serde::{Deserialize, Serialize};
use super::{Metadata, MetaValue, SemanticNodeId};

/// Kind of semantic unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    /// Verbal root from the lexicon.
    Dhatu,
    /// Surface material with no lexicon entry.
    Pattern,
    Concept,
    /// Multi-word lexicon entry.
    Idiom,
    Entity,
}

impl UnitType {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitType::Dhatu => "dhatu",
            UnitType::Pattern => "pattern",
            UnitType::Concept => "concept",
            UnitType::Idiom => "idiom",
            UnitType::Entity => "entity",
        }
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit identifier, equal to its sequence position. Rendered as `u{index}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl UnitId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// One unit of a [`SemanticRepresentation`](super::SemanticRepresentation).
///
/// Units are created only through the owning representation and are
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticUnit {
    id: UnitId,
    #[serde(rename = "type")]
    unit_type: UnitType,
    value: String,
    position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    node: Option<SemanticNodeId>,
    /// Whitespace following the unit in the source text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    separator: String,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    metadata: Metadata,
}

impl SemanticUnit {
    pub(crate) fn new(
        id: UnitId,
        unit_type: UnitType,
        value: String,
        position: usize,
        node: Option<SemanticNodeId>,
        metadata: Metadata,
    ) -> Self {
        Self { id, unit_type, value, position, node, separator: String::new(), metadata }
    }

    pub fn id(&self) -> UnitId { self.id }
    pub fn unit_type(&self) -> UnitType { self.unit_type }
    pub fn value(&self) -> &str { &self.value }
    pub fn position(&self) -> usize { self.position }
    pub fn node(&self) -> Option<SemanticNodeId> { self.node }
    pub fn separator(&self) -> &str { &self.separator }
    pub fn metadata(&self) -> &Metadata { &self.metadata }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.metadata.get(key)
    }

    pub(crate) fn separator_mut(&mut self) -> &mut String {
        &mut self.separator
    }
}
