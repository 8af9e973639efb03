//! Hybrid semantic representation: ordered units + relation graph.
//!
//! ```text
//!   sequence:  u0 "Le"   u1 roi     u2 √jñā     u3 "le"   u4 royaume
//!                        │          │                     │
//!   graph:               n0 ─AGENT→ n1 ─PATIENT→          n2
//! ```
//!
//! The sequence preserves textual order; the graph carries relations. Only
//! units created with `create_node = true` appear in the graph, so unit
//! positions and node ids are separate numbering spaces.
//!
//! Each unit also keeps the whitespace that followed it in the source, so
//! `value + separator` over the sequence regenerates every unmapped stretch
//! of text exactly.

use serde::{Deserialize, Serialize};

use super::{Metadata, MetaValue, RelationType, SemanticEdge, SemanticGraph, SemanticUnit, UnitId, UnitType};
use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticRepresentation {
    sequence: Vec<SemanticUnit>,
    graph: SemanticGraph,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    metadata: Metadata,
}

impl SemanticRepresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Append a unit at the next sequence position.
    pub fn add_unit(&mut self, unit_type: UnitType, value: impl Into<String>, create_node: bool) -> UnitId {
        self.add_unit_with_metadata(unit_type, value, create_node, Metadata::new())
    }

    pub fn add_unit_with_metadata(
        &mut self,
        unit_type: UnitType,
        value: impl Into<String>,
        create_node: bool,
        metadata: Metadata,
    ) -> UnitId {
        let value = value.into();
        let position = self.sequence.len();
        let id = UnitId(position as u32);
        let node = create_node.then(|| self.graph.add_node(unit_type, &value));
        self.sequence.push(SemanticUnit::new(id, unit_type, value, position, node, metadata));
        id
    }

    /// Relate two units through their graph nodes (weight 1.0).
    ///
    /// Both units must own a graph node.
    pub fn add_relation(&mut self, from: UnitId, to: UnitId, relation: RelationType) -> Result<()> {
        self.add_weighted_relation(from, to, relation, 1.0)
    }

    pub fn add_weighted_relation(
        &mut self,
        from: UnitId,
        to: UnitId,
        relation: RelationType,
        weight: f32,
    ) -> Result<()> {
        if !weight.is_finite() {
            return Err(Error::NonFinite(format!("weight of relation {from} -[{relation}]-> {to}")));
        }
        let src = self.node_of(from)?;
        let dst = self.node_of(to)?;
        self.graph.add_edge(SemanticEdge::new(src, dst, relation).with_weight(weight));
        Ok(())
    }

    /// Record the whitespace that follows a unit.
    pub fn set_separator(&mut self, id: UnitId, separator: impl Into<String>) -> Result<()> {
        let separator = separator.into();
        check_separator(id, &separator)?;
        let unit = self.sequence.get_mut(id.index()).ok_or(Error::UnknownUnit(id))?;
        *unit.separator_mut() = separator;
        Ok(())
    }

    /// Append whitespace after the last unit. Returns `false` when there is
    /// no unit to carry it.
    pub fn extend_last_separator(&mut self, whitespace: &str) -> Result<bool> {
        let Some(unit) = self.sequence.last_mut() else {
            return Ok(false);
        };
        check_separator(unit.id(), whitespace)?;
        unit.separator_mut().push_str(whitespace);
        Ok(true)
    }

    fn node_of(&self, id: UnitId) -> Result<super::SemanticNodeId> {
        let unit = self.unit(id).ok_or(Error::UnknownUnit(id))?;
        unit.node().ok_or(Error::MissingGraphNode { unit: id })
    }

    // ========================================================================
    // Access
    // ========================================================================

    pub fn unit(&self, id: UnitId) -> Option<&SemanticUnit> {
        self.sequence.get(id.index())
    }

    pub fn units(&self) -> &[SemanticUnit] {
        &self.sequence
    }

    pub fn graph(&self) -> &SemanticGraph {
        &self.graph
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Source language recorded by the analyzer, if any.
    pub fn language(&self) -> Option<&str> {
        self.metadata.get("language").and_then(MetaValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serialize the payload.
    ///
    /// JSON has no encoding for NaN or infinities, so any non-finite float
    /// in the metadata is rejected instead of being written as `null`.
    pub fn to_json(&self) -> Result<String> {
        self.check_finite()?;
        Ok(serde_json::to_string(self)?)
    }

    fn check_finite(&self) -> Result<()> {
        let non_finite = |meta: &Metadata| meta.iter().find(|(_, v)| !v.is_finite()).map(|(k, _)| k.clone());
        if let Some(key) = non_finite(&self.metadata) {
            return Err(Error::NonFinite(format!("representation metadata `{key}`")));
        }
        for unit in &self.sequence {
            if let Some(key) = non_finite(unit.metadata()) {
                return Err(Error::NonFinite(format!("metadata `{key}` of unit {}", unit.id())));
            }
        }
        for node in self.graph.nodes() {
            if let Some(key) = non_finite(&node.attributes) {
                return Err(Error::NonFinite(format!("attribute `{key}` of node {}", node.id)));
            }
        }
        if let Some(edge) = self.graph.edges().iter().find(|e| !e.weight.is_finite()) {
            return Err(Error::NonFinite(format!("weight of edge {} -> {}", edge.from, edge.to)));
        }
        Ok(())
    }

    /// Parse a payload and check its structural invariants.
    pub fn from_json(payload: &str) -> Result<Self> {
        let repr: Self = serde_json::from_str(payload)?;
        repr.validate()?;
        Ok(repr)
    }

    pub fn validate(&self) -> Result<()> {
        self.graph.check_structure().map_err(Error::InvalidPayload)?;

        let mut linked = vec![false; self.graph.node_count()];
        for (i, unit) in self.sequence.iter().enumerate() {
            if unit.position() != i || unit.id().index() != i {
                return Err(Error::InvalidPayload(format!(
                    "unit {} sits at index {i} with position {}",
                    unit.id(),
                    unit.position()
                )));
            }
            check_separator(unit.id(), unit.separator()).map_err(|_| {
                Error::InvalidPayload(format!("separator of unit {} is not whitespace", unit.id()))
            })?;
            if let Some(node) = unit.node() {
                let slot = linked.get_mut(node.index()).ok_or_else(|| {
                    Error::InvalidPayload(format!("unit {} links missing node {node}", unit.id()))
                })?;
                if *slot {
                    return Err(Error::InvalidPayload(format!("node {node} is linked by two units")));
                }
                *slot = true;
            }
        }
        if let Some(orphan) = linked.iter().position(|l| !l) {
            return Err(Error::InvalidPayload(format!("node n{orphan} is not linked by any unit")));
        }
        Ok(())
    }
}

fn check_separator(id: UnitId, separator: &str) -> Result<()> {
    if separator.chars().all(char::is_whitespace) {
        Ok(())
    } else {
        Err(Error::InvalidSeparator { unit: id })
    }
}
