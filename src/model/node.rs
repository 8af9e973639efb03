//! Node in the semantic graph.

use serde::{Deserialize, Serialize};
use super::{Metadata, MetaValue, UnitType};

/// Semantic graph node identifier.
///
/// Nodes are numbered densely from zero in creation order, independently of
/// unit positions. Rendered as `n{index}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SemanticNodeId(pub u32);

impl SemanticNodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SemanticNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A node in the semantic graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticNode {
    pub id: SemanticNodeId,
    pub node_type: UnitType,
    pub value: String,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub attributes: Metadata,
}

impl SemanticNode {
    pub fn new(id: SemanticNodeId, node_type: UnitType, value: impl Into<String>) -> Self {
        Self {
            id,
            node_type,
            value: value.into(),
            attributes: Metadata::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.attributes.get(key)
    }
}
