//! Semantic graph — typed relations between the nodes of one representation.

use serde::{Deserialize, Serialize};
use super::{RelationType, SemanticEdge, SemanticNode, SemanticNodeId, UnitType};

/// Conceptual graph attached to a representation.
///
/// Node ids are dense indices into `nodes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticGraph {
    nodes: Vec<SemanticNode>,
    edges: Vec<SemanticEdge>,
}

impl SemanticGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node with the next id.
    pub(crate) fn add_node(&mut self, node_type: UnitType, value: &str) -> SemanticNodeId {
        let id = SemanticNodeId(self.nodes.len() as u32);
        self.nodes.push(SemanticNode::new(id, node_type, value));
        id
    }

    pub(crate) fn add_edge(&mut self, edge: SemanticEdge) {
        self.edges.push(edge);
    }

    pub fn node(&self, id: SemanticNodeId) -> Option<&SemanticNode> {
        self.nodes.get(id.index())
    }

    pub fn contains(&self, id: SemanticNodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn nodes(&self) -> &[SemanticNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[SemanticEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Targets of outgoing edges, in edge insertion order.
    pub fn get_neighbors(&self, id: SemanticNodeId) -> Vec<SemanticNodeId> {
        self.edges
            .iter()
            .filter(|e| e.from == id)
            .map(|e| e.to)
            .collect()
    }

    /// Outgoing edges carrying the given relation.
    pub fn edges_of(&self, id: SemanticNodeId, relation: RelationType) -> impl Iterator<Item = &SemanticEdge> {
        self.edges
            .iter()
            .filter(move |e| e.from == id && e.relation == relation)
    }

    /// Check that node ids are dense and edges only reference known nodes.
    pub(crate) fn check_structure(&self) -> Result<(), String> {
        for (i, node) in self.nodes.iter().enumerate() {
            if node.id.index() != i {
                return Err(format!("node at index {i} carries id {}", node.id));
            }
        }
        for edge in &self.edges {
            if !self.contains(edge.from) || !self.contains(edge.to) {
                return Err(format!(
                    "edge {} -[{}]-> {} references a missing node",
                    edge.from, edge.relation, edge.to
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_follow_outgoing_edges() {
        let mut g = SemanticGraph::new();
        let a = g.add_node(UnitType::Entity, "roi");
        let b = g.add_node(UnitType::Dhatu, "√jñā");
        let c = g.add_node(UnitType::Entity, "royaume");
        g.add_edge(SemanticEdge::new(a, b, RelationType::Agent));
        g.add_edge(SemanticEdge::new(b, c, RelationType::Patient));

        assert_eq!(g.get_neighbors(a), vec![b]);
        assert_eq!(g.get_neighbors(b), vec![c]);
        assert!(g.get_neighbors(c).is_empty());
        assert_eq!(g.edges_of(b, RelationType::Patient).count(), 1);
        assert!(g.check_structure().is_ok());
    }

    #[test]
    fn test_dangling_edge_is_reported() {
        let mut g = SemanticGraph::new();
        let a = g.add_node(UnitType::Entity, "roi");
        g.add_edge(SemanticEdge::new(a, SemanticNodeId(7), RelationType::Agent));
        assert!(g.check_structure().is_err());
    }
}
