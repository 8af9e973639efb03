//! # Concept Graph (lexicon)
//!
//! Nodes are semantic roots (dhātu, entities, concepts, idioms) with a
//! fixed-dimensionality embedding. The graph offers two independent kinds
//! of lookup:
//!
//! ```text
//!   get_neighbors(√kṛ)          → plain directed adjacency ("related")
//!   find_similar(embedding, k)  → cosine ranking over all embeddings
//!   lookup_form("conquiert")    → surface form index used by analyzers
//! ```
//!
//! Morphology, syntax and lexicalization are NOT graph methods. They live
//! in [`functions`] as pure functions over a [`ConceptNode`], so they can be
//! swapped per language without touching the graph.
//!
//! The graph is built once, then frozen behind an `Arc`. Runtime updates go
//! through [`SharedLexicon`], which swaps whole snapshots.

pub mod functions;
pub mod loader;
pub mod shared;
pub mod similarity;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::SimilarityConfig;
use crate::model::{Metadata, MetaValue, UnitType};
use crate::{Error, Result};

pub use loader::{LexiconEntry, LexiconFile, SurfaceFormSpec, LEXICON_VERSION};
pub use shared::SharedLexicon;
pub use similarity::cosine_similarity;

// ============================================================================
// ConceptNode
// ============================================================================

/// Lexicon identifier (e.g. `"d1"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConceptId(pub String);

impl ConceptId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConceptId {
    fn from(s: &str) -> Self { ConceptId(s.to_string()) }
}

impl std::fmt::Display for ConceptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A lexicon node: one semantic root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptNode {
    pub id: ConceptId,
    /// Canonical root, e.g. `√kṛ`.
    pub root: String,
    /// Comma-separated senses, e.g. `"to know, conquer"`.
    pub gloss: String,
    /// Unit type produced when a text token maps to this node.
    pub kind: UnitType,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ConceptNode {
    pub fn new(
        id: impl Into<String>,
        root: impl Into<String>,
        gloss: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: ConceptId(id.into()),
            root: root.into(),
            gloss: gloss.into(),
            kind: UnitType::Dhatu,
            embedding,
            metadata: Metadata::new(),
        }
    }

    pub fn with_kind(mut self, kind: UnitType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Surface word for `language`, stored as `lex.<language>` metadata.
    pub fn with_lexicalization(self, language: &str, word: impl Into<String>) -> Self {
        self.with_metadata(format!("lex.{language}"), word.into())
    }
}

/// Where a surface form points: a concept and the sense it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormEntry {
    node: usize,
    sense: u8,
}

/// Normalize a surface form for the form index: lowercase, single spaces.
pub fn normalize_form(form: &str) -> String {
    form.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// ConceptGraph
// ============================================================================

/// Lexicon graph of semantic roots.
///
/// Nodes keep insertion order; similarity ties resolve in that order.
#[derive(Debug, Clone)]
pub struct ConceptGraph {
    dimension: usize,
    nodes: Vec<ConceptNode>,
    /// concept id → index into `nodes`
    index: HashMap<ConceptId, usize>,
    /// node index → related node indices (unweighted, deduplicated)
    adjacency: Vec<SmallVec<[usize; 4]>>,
    /// normalized surface form → concept + sense
    forms: HashMap<String, FormEntry>,
    /// longest registered form, in whitespace-separated tokens
    max_form_tokens: usize,
}

impl ConceptGraph {
    /// Empty graph whose embeddings all have `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            nodes: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
            forms: HashMap::new(),
            max_form_tokens: 0,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Add a node and return its id.
    pub fn add_node(&mut self, node: ConceptNode) -> Result<ConceptId> {
        if node.embedding.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got: node.embedding.len(),
            });
        }
        if self.index.contains_key(&node.id) {
            return Err(Error::DuplicateConcept(node.id));
        }
        let id = node.id.clone();
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(node);
        self.adjacency.push(SmallVec::new());
        Ok(id)
    }

    /// Add a directed "related concept" edge.
    ///
    /// Idempotent: returns `false` if the edge already existed.
    pub fn add_edge(&mut self, from: &ConceptId, to: &ConceptId) -> Result<bool> {
        let src = self.position(from)?;
        let dst = self.position(to)?;
        let list = &mut self.adjacency[src];
        if list.contains(&dst) {
            return Ok(false);
        }
        list.push(dst);
        Ok(true)
    }

    /// Register a surface form (one or more words) for a concept.
    ///
    /// `sense` is the index into the concept's comma-separated gloss that
    /// this form selects. A form registered twice points at the latest
    /// concept.
    pub fn add_surface_form(&mut self, form: &str, concept: &ConceptId, sense: u8) -> Result<()> {
        let node = self.position(concept)?;
        let key = normalize_form(form);
        if key.is_empty() {
            return Ok(());
        }
        let tokens = key.split(' ').count();
        self.max_form_tokens = self.max_form_tokens.max(tokens);
        if let Some(prev) = self.forms.insert(key, FormEntry { node, sense }) {
            if prev.node != node {
                tracing::debug!(form, concept = %concept, "surface form reassigned");
            }
        }
        Ok(())
    }

    fn position(&self, id: &ConceptId) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownConceptRef(id.clone()))
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn get(&self, id: &ConceptId) -> Option<&ConceptNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &ConceptId) -> bool {
        self.index.contains_key(id)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &ConceptNode> {
        self.nodes.iter()
    }

    /// Related concepts of `id`. Unknown ids have no neighbors.
    pub fn get_neighbors(&self, id: &ConceptId) -> Vec<&ConceptNode> {
        match self.index.get(id) {
            Some(&i) => self.adjacency[i].iter().map(|&j| &self.nodes[j]).collect(),
            None => Vec::new(),
        }
    }

    /// Look up a surface form; returns the concept and the selected sense.
    pub fn lookup_form(&self, form: &str) -> Option<(&ConceptNode, u8)> {
        self.forms
            .get(&normalize_form(form))
            .map(|e| (&self.nodes[e.node], e.sense))
    }

    /// Longest registered surface form, in tokens.
    pub fn max_form_tokens(&self) -> usize {
        self.max_form_tokens
    }

    pub fn form_count(&self) -> usize {
        self.forms.len()
    }

    // ========================================================================
    // Similarity search
    // ========================================================================

    /// Nodes with cosine similarity ≥ `threshold`, best first, at most
    /// `top_k`. Equal scores keep insertion order.
    pub fn find_similar(&self, query: &[f32], top_k: usize, threshold: f32) -> Vec<&ConceptNode> {
        self.find_similar_scored(query, top_k, threshold)
            .into_iter()
            .map(|(node, _)| node)
            .collect()
    }

    /// Like [`find_similar`](Self::find_similar), with scores.
    pub fn find_similar_scored(&self, query: &[f32], top_k: usize, threshold: f32) -> Vec<(&ConceptNode, f32)> {
        if top_k == 0 {
            return Vec::new();
        }
        if query.len() != self.dimension {
            tracing::warn!(
                expected = self.dimension,
                got = query.len(),
                "similarity query has wrong dimension"
            );
            return Vec::new();
        }

        let mut scored: Vec<(&ConceptNode, f32)> = self
            .nodes
            .iter()
            .filter_map(|node| {
                let score = cosine_similarity(query, &node.embedding)?;
                // NaN compares false and never qualifies.
                (score >= threshold).then_some((node, score))
            })
            .collect();

        // Stable sort: ties stay in insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);
        scored
    }

    /// Concepts similar to an existing node, excluding the node itself.
    pub fn propagate(&self, id: &ConceptId, top_k: usize, threshold: f32) -> Vec<(&ConceptNode, f32)> {
        let Some(node) = self.get(id) else {
            return Vec::new();
        };
        let mut similar = self.find_similar_scored(&node.embedding, top_k.saturating_add(1), threshold);
        similar.retain(|(n, _)| n.id != *id);
        similar.truncate(top_k);
        similar
    }

    /// [`propagate`](Self::propagate) with configured bounds.
    pub fn propagate_with(&self, id: &ConceptId, config: &SimilarityConfig) -> Vec<(&ConceptNode, f32)> {
        self.propagate(id, config.top_k, config.threshold)
    }
}
