//! Semantic representation → draft text.
//!
//! Compression and decompression must use the same generator; the guide
//! is only valid against the draft it was computed from.

use std::sync::Arc;

use crate::lexicon::functions::lexical;
use crate::lexicon::{ConceptGraph, ConceptId};
use crate::model::{MetaValue, SemanticRepresentation};

/// Regenerates a surface draft from a representation.
///
/// Must be deterministic. Closures work too:
///
/// ```rust
/// use dhatu_codec::pipeline::DraftGenerator;
/// use dhatu_codec::SemanticRepresentation;
///
/// let upper = |r: &SemanticRepresentation| {
///     r.units().iter().map(|u| u.value().to_uppercase()).collect::<Vec<_>>().join(" ")
/// };
/// assert_eq!(upper.generate(&SemanticRepresentation::new()), "");
/// ```
pub trait DraftGenerator: Send + Sync {
    fn generate(&self, repr: &SemanticRepresentation) -> String;
}

impl<F> DraftGenerator for F
where
    F: Fn(&SemanticRepresentation) -> String + Send + Sync,
{
    fn generate(&self, repr: &SemanticRepresentation) -> String {
        self(repr)
    }
}

/// Unit values in sequence order, each followed by its separator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatDraft;

impl DraftGenerator for ConcatDraft {
    fn generate(&self, repr: &SemanticRepresentation) -> String {
        join_units(repr, |unit| unit.value())
    }
}

/// Renders concept units through their lexicalization in the
/// representation's language; other units pass through. Separators are
/// kept as recorded.
#[derive(Debug, Clone)]
pub struct LexicalizingDraft {
    lexicon: Arc<ConceptGraph>,
}

impl LexicalizingDraft {
    pub fn new(lexicon: Arc<ConceptGraph>) -> Self {
        Self { lexicon }
    }
}

impl DraftGenerator for LexicalizingDraft {
    fn generate(&self, repr: &SemanticRepresentation) -> String {
        let language = repr.language();
        join_units(repr, |unit| {
            let concept = unit.get("concept").and_then(MetaValue::as_str);
            match (concept, language) {
                (Some(id), Some(lang)) => match self.lexicon.get(&ConceptId::from(id)) {
                    Some(node) => lexical::lexicalize(node, lang),
                    None => unit.value(),
                },
                _ => unit.value(),
            }
        })
    }
}

fn join_units<'a>(
    repr: &'a SemanticRepresentation,
    render: impl Fn(&'a crate::model::SemanticUnit) -> &'a str,
) -> String {
    let mut out = String::new();
    for unit in repr.units() {
        out.push_str(render(unit));
        out.push_str(unit.separator());
    }
    out
}
