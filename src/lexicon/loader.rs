//! Static lexicon loading.
//!
//! Lexicons are read once at process start from a versioned JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "dimension": 8,
//!   "concepts": [
//!     { "id": "d6", "root": "√jñā", "gloss": "to know, conquer",
//!       "kind": "dhatu", "embedding": [0.1, ...],
//!       "forms": ["sait", {"form": "conquiert", "sense": 1}],
//!       "lexicalizations": {"fr": "savoir"},
//!       "related": ["d4"] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ConceptGraph, ConceptId, ConceptNode};
use crate::model::{Metadata, UnitType};
use crate::{Error, Result};

/// Lexicon schema version understood by this crate.
pub const LEXICON_VERSION: u32 = 1;

/// On-disk lexicon document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconFile {
    pub version: u32,
    pub dimension: usize,
    pub concepts: Vec<LexiconEntry>,
}

/// One concept in a lexicon document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub id: String,
    pub root: String,
    #[serde(default)]
    pub gloss: String,
    #[serde(default = "default_kind")]
    pub kind: UnitType,
    pub embedding: Vec<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forms: Vec<SurfaceFormSpec>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lexicalizations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

fn default_kind() -> UnitType {
    UnitType::Dhatu
}

/// A surface form, optionally selecting a sense of the gloss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SurfaceFormSpec {
    Plain(String),
    WithSense { form: String, sense: u8 },
}

impl SurfaceFormSpec {
    pub fn form(&self) -> &str {
        match self {
            SurfaceFormSpec::Plain(f) => f,
            SurfaceFormSpec::WithSense { form, .. } => form,
        }
    }

    pub fn sense(&self) -> u8 {
        match self {
            SurfaceFormSpec::Plain(_) => 0,
            SurfaceFormSpec::WithSense { sense, .. } => *sense,
        }
    }
}

impl LexiconFile {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// LexiconFile ↔ ConceptGraph
// ============================================================================

impl ConceptGraph {
    /// Build a graph from a lexicon document.
    ///
    /// Nodes are added first, then surface forms, then `related` edges, so
    /// entries may reference concepts defined later in the file.
    pub fn from_lexicon(file: &LexiconFile) -> Result<Self> {
        if file.version != LEXICON_VERSION {
            return Err(Error::UnsupportedLexiconVersion {
                found: file.version,
                supported: LEXICON_VERSION,
            });
        }

        let mut graph = ConceptGraph::new(file.dimension);
        for entry in &file.concepts {
            let mut node = ConceptNode::new(&entry.id, &entry.root, &entry.gloss, entry.embedding.clone())
                .with_kind(entry.kind);
            node.metadata = entry.metadata.clone();
            for (language, word) in &entry.lexicalizations {
                node = node.with_lexicalization(language, word.as_str());
            }
            graph.add_node(node)?;
        }

        for entry in &file.concepts {
            let id = ConceptId(entry.id.clone());
            for spec in &entry.forms {
                graph.add_surface_form(spec.form(), &id, spec.sense())?;
            }
            for related in &entry.related {
                graph.add_edge(&id, &ConceptId(related.clone()))?;
            }
        }

        tracing::debug!(
            concepts = graph.len(),
            forms = graph.form_count(),
            dimension = graph.dimension(),
            "lexicon loaded"
        );
        Ok(graph)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_lexicon(&LexiconFile::from_json_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_lexicon(&LexiconFile::from_path(path)?)
    }

    /// Export the graph as a lexicon document.
    pub fn to_lexicon(&self) -> LexiconFile {
        let mut entries: Vec<LexiconEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let mut metadata = Metadata::new();
                let mut lexicalizations = BTreeMap::new();
                for (key, value) in &node.metadata {
                    match (key.strip_prefix("lex."), value.as_str()) {
                        (Some(lang), Some(word)) => {
                            lexicalizations.insert(lang.to_string(), word.to_string());
                        }
                        _ => {
                            metadata.insert(key.clone(), value.clone());
                        }
                    }
                }
                LexiconEntry {
                    id: node.id.0.clone(),
                    root: node.root.clone(),
                    gloss: node.gloss.clone(),
                    kind: node.kind,
                    embedding: node.embedding.clone(),
                    forms: Vec::new(),
                    lexicalizations,
                    related: self.adjacency[i].iter().map(|&j| self.nodes[j].id.0.clone()).collect(),
                    metadata,
                }
            })
            .collect();

        // Forms sorted for a stable document.
        let mut forms: Vec<_> = self.forms.iter().collect();
        forms.sort_by(|a, b| a.0.cmp(b.0));
        for (form, entry) in forms {
            let spec = match entry.sense {
                0 => SurfaceFormSpec::Plain(form.clone()),
                sense => SurfaceFormSpec::WithSense { form: form.clone(), sense },
            };
            entries[entry.node].forms.push(spec);
        }

        LexiconFile {
            version: LEXICON_VERSION,
            dimension: self.dimension,
            concepts: entries,
        }
    }

    /// The reference dhātu lexicon: six verbal roots, two entities and one
    /// idiom, with French and English surface forms.
    pub fn builtin() -> Result<Self> {
        Self::from_lexicon(&builtin_lexicon())
    }
}

/// Dimension of the builtin lexicon's embeddings.
pub const BUILTIN_DIMENSION: usize = 8;

fn entry(
    id: &str,
    root: &str,
    gloss: &str,
    kind: UnitType,
    embedding: [f32; BUILTIN_DIMENSION],
    forms: &[(&str, u8)],
    lexicalizations: &[(&str, &str)],
    related: &[&str],
) -> LexiconEntry {
    LexiconEntry {
        id: id.into(),
        root: root.into(),
        gloss: gloss.into(),
        kind,
        embedding: embedding.to_vec(),
        forms: forms
            .iter()
            .map(|&(form, sense)| match sense {
                0 => SurfaceFormSpec::Plain(form.into()),
                sense => SurfaceFormSpec::WithSense { form: form.into(), sense },
            })
            .collect(),
        lexicalizations: lexicalizations
            .iter()
            .map(|&(l, w)| (l.to_string(), w.to_string()))
            .collect(),
        related: related.iter().map(|r| r.to_string()).collect(),
        metadata: Metadata::new(),
    }
}

pub fn builtin_lexicon() -> LexiconFile {
    use UnitType::{Dhatu, Entity, Idiom};

    LexiconFile {
        version: LEXICON_VERSION,
        dimension: BUILTIN_DIMENSION,
        concepts: vec![
            entry("d1", "√kṛ", "to do, make", Dhatu,
                [0.50, 0.30, 0.80, 0.10, 0.00, 0.20, 0.10, 0.00],
                &[("fait", 0), ("faire", 0), ("fais", 0), ("does", 0), ("makes", 1)],
                &[("fr", "fait"), ("en", "does")],
                &["d2", "d3"]),
            entry("d2", "√gam", "to go", Dhatu,
                [0.40, 0.60, 0.20, 0.00, 0.30, 0.10, 0.00, 0.10],
                &[("va", 0), ("vont", 0), ("aller", 0), ("goes", 0)],
                &[("fr", "va"), ("en", "goes")],
                &[]),
            entry("d3", "√bhū", "to become, be", Dhatu,
                [0.60, 0.20, 0.70, 0.20, 0.00, 0.10, 0.20, 0.00],
                &[("devient", 0), ("devenir", 0), ("becomes", 0), ("est", 1), ("is", 1)],
                &[("fr", "devient"), ("en", "becomes")],
                &[]),
            entry("d4", "√vac", "to speak, say", Dhatu,
                [0.10, 0.20, 0.10, 0.80, 0.40, 0.00, 0.10, 0.20],
                &[("parle", 0), ("dit", 1), ("speaks", 0), ("says", 1)],
                &[("fr", "dit"), ("en", "says")],
                &[]),
            entry("d5", "√dā", "to give", Dhatu,
                [0.20, 0.10, 0.30, 0.30, 0.80, 0.10, 0.00, 0.10],
                &[("donne", 0), ("gives", 0)],
                &[("fr", "donne"), ("en", "gives")],
                &[]),
            entry("d6", "√jñā", "to know, conquer", Dhatu,
                [0.30, 0.20, 0.40, 0.50, 0.10, 0.70, 0.20, 0.00],
                &[("sait", 0), ("connaît", 0), ("knows", 0), ("conquiert", 1), ("conquers", 1)],
                &[("fr", "sait"), ("en", "knows")],
                &["d4"]),
            entry("e1", "roi", "king, ruler", Entity,
                [0.00, 0.10, 0.00, 0.20, 0.10, 0.30, 0.90, 0.20],
                &[("roi", 0), ("king", 0), ("rāja", 0)],
                &[("fr", "roi"), ("en", "king")],
                &["e2"]),
            entry("e2", "royaume", "kingdom, realm", Entity,
                [0.10, 0.00, 0.10, 0.10, 0.20, 0.20, 0.80, 0.40],
                &[("royaume", 0), ("kingdom", 0), ("rājya", 0)],
                &[("fr", "royaume"), ("en", "kingdom")],
                &[]),
            entry("i1", "sāhasena", "with courage, bravely", Idiom,
                [0.20, 0.30, 0.10, 0.10, 0.10, 0.40, 0.30, 0.70],
                &[("avec bravoure", 0), ("with courage", 0), ("courageusement", 1)],
                &[("fr", "avec bravoure"), ("en", "with courage")],
                &[]),
        ],
    }
}
