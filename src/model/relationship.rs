//! Relation (edge) in the semantic graph.

use serde::{Deserialize, Serialize};
use super::SemanticNodeId;

/// Kāraka-style semantic role carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    /// Acting subject.
    Agent,
    /// Affected object.
    Patient,
    /// Means.
    Instrument,
    Manner,
    Cause,
    Purpose,
    Location,
    Time,
}

impl RelationType {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationType::Agent => "AGENT",
            RelationType::Patient => "PATIENT",
            RelationType::Instrument => "INSTRUMENT",
            RelationType::Manner => "MANNER",
            RelationType::Cause => "CAUSE",
            RelationType::Purpose => "PURPOSE",
            RelationType::Location => "LOCATION",
            RelationType::Time => "TIME",
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed, weighted edge between two semantic nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticEdge {
    pub from: SemanticNodeId,
    pub to: SemanticNodeId,
    pub relation: RelationType,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

impl SemanticEdge {
    pub fn new(from: SemanticNodeId, to: SemanticNodeId, relation: RelationType) -> Self {
        Self { from, to, relation, weight: default_weight() }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}
