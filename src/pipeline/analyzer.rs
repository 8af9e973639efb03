//! Text → semantic representation.

use crate::lexicon::ConceptGraph;
use crate::model::{Metadata, MetaValue, RelationType, SemanticRepresentation, UnitId, UnitType};
use crate::Result;

/// Turns text into a [`SemanticRepresentation`].
///
/// An analyzer may be lossy: whatever it drops is recovered by the guide.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str, language: &str, lexicon: &ConceptGraph) -> Result<SemanticRepresentation>;

    /// Analyze with lexicon mapping confined to `text[..limit]`.
    ///
    /// The cut moves back to the start of the token straddling `limit`;
    /// everything after it is appended verbatim.
    fn analyze_within(
        &self,
        text: &str,
        language: &str,
        lexicon: &ConceptGraph,
        limit: usize,
    ) -> Result<SemanticRepresentation> {
        let split = token_boundary(text, limit);
        let mut repr = self.analyze(&text[..split], language, lexicon)?;
        append_verbatim(&mut repr, &text[split..])?;
        Ok(repr)
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// A whitespace-delimited token and the whitespace run that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub word: &'a str,
    pub separator: &'a str,
}

/// Split `text` into its leading whitespace and the tokens after it.
///
/// `leading + Σ (word + separator)` reproduces `text` exactly.
pub fn tokenize(text: &str) -> (&str, Vec<Token<'_>>) {
    let body = text.trim_start();
    let leading = &text[..text.len() - body.len()];
    let mut tokens = Vec::new();
    let mut rest = body;
    while !rest.is_empty() {
        let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (word, tail) = rest.split_at(word_end);
        let sep_end = tail.find(|c: char| !c.is_whitespace()).unwrap_or(tail.len());
        let (separator, next) = tail.split_at(sep_end);
        tokens.push(Token { word, separator });
        rest = next;
    }
    (leading, tokens)
}

/// Largest offset `<= limit` that does not cut through a token.
fn token_boundary(text: &str, limit: usize) -> usize {
    let mut at = limit.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    text[..at].trim_end_matches(|c: char| !c.is_whitespace()).len()
}

/// Append `text` as node-less Pattern units that regenerate it exactly.
pub fn append_verbatim(repr: &mut SemanticRepresentation, text: &str) -> Result<()> {
    let (leading, tokens) = tokenize(text);
    if !leading.is_empty() && !repr.extend_last_separator(leading)? {
        repr.add_unit(UnitType::Pattern, leading, false);
    }
    for token in tokens {
        let id = repr.add_unit(UnitType::Pattern, token.word, false);
        repr.set_separator(id, token.separator)?;
    }
    Ok(())
}

/// Whitespace tokenizer with greedy longest-phrase lexicon matching.
///
/// Mapped phrases become units of the concept's kind, carrying `concept`
/// and `sense` metadata and a graph node. Everything else is kept verbatim
/// as a node-less `Pattern` unit. Every unit keeps the whitespace that
/// followed it; leading whitespace becomes a Pattern unit of its own.
#[derive(Debug, Clone)]
pub struct GreedyAnalyzer {
    max_phrase_tokens: usize,
}

impl GreedyAnalyzer {
    pub fn new(max_phrase_tokens: usize) -> Self {
        Self {
            max_phrase_tokens: max_phrase_tokens.max(1),
        }
    }
}

impl Default for GreedyAnalyzer {
    fn default() -> Self {
        Self::new(4)
    }
}

fn is_edge_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '«' | '»' | '“' | '”' | '‘' | '’' | '…' | '¡' | '¿' | '।' | '॥')
}

impl Analyzer for GreedyAnalyzer {
    fn analyze(&self, text: &str, language: &str, lexicon: &ConceptGraph) -> Result<SemanticRepresentation> {
        let (leading, tokens) = tokenize(text);
        let mut repr = SemanticRepresentation::new().with_metadata("language", language);
        if !leading.is_empty() {
            repr.add_unit(UnitType::Pattern, leading, false);
        }
        let widest = self.max_phrase_tokens.min(lexicon.max_form_tokens().max(1));

        let mut i = 0;
        while i < tokens.len() {
            let mut matched = None;
            if !tokens[i].word.contains('\0') {
                let longest = widest.min(tokens.len() - i);
                for width in (1..=longest).rev() {
                    let words = &tokens[i..i + width];
                    if words.iter().any(|t| t.word.contains('\0')) {
                        continue;
                    }
                    let phrase = words.iter().map(|t| t.word).collect::<Vec<_>>().join(" ");
                    let key = phrase.trim_matches(is_edge_punctuation);
                    if key.is_empty() {
                        continue;
                    }
                    if let Some((node, sense)) = lexicon.lookup_form(key) {
                        matched = Some((node, sense, width));
                        break;
                    }
                }
            }

            match matched {
                Some((node, sense, width)) => {
                    let mut meta = Metadata::new();
                    meta.insert("concept".into(), MetaValue::from(node.id.as_str()));
                    meta.insert("sense".into(), MetaValue::from(sense));
                    let id = repr.add_unit_with_metadata(node.kind, node.root.as_str(), true, meta);
                    repr.set_separator(id, tokens[i + width - 1].separator)?;
                    i += width;
                }
                None => {
                    let id = repr.add_unit(UnitType::Pattern, tokens[i].word, false);
                    repr.set_separator(id, tokens[i].separator)?;
                    i += 1;
                }
            }
        }

        link_roles(&mut repr)?;
        tracing::trace!(
            tokens = tokens.len(),
            units = repr.len(),
            nodes = repr.graph().node_count(),
            "text analyzed"
        );
        Ok(repr)
    }
}

/// Agent from the nearest preceding entity, patient to the nearest
/// following entity, for every verbal root.
fn link_roles(repr: &mut SemanticRepresentation) -> Result<()> {
    let linked: Vec<(UnitId, UnitType)> = repr
        .units()
        .iter()
        .filter(|u| u.node().is_some())
        .map(|u| (u.id(), u.unit_type()))
        .collect();

    for (i, &(verb, kind)) in linked.iter().enumerate() {
        if kind != UnitType::Dhatu {
            continue;
        }
        let agent = linked[..i].iter().rev().find(|(_, k)| *k == UnitType::Entity);
        let patient = linked[i + 1..].iter().find(|(_, k)| *k == UnitType::Entity);
        if let Some(&(agent, _)) = agent {
            repr.add_relation(agent, verb, RelationType::Agent)?;
        }
        if let Some(&(patient, _)) = patient {
            repr.add_relation(verb, patient, RelationType::Patient)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn analyze(text: &str) -> SemanticRepresentation {
        let lexicon = ConceptGraph::builtin().unwrap();
        GreedyAnalyzer::default().analyze(text, "fr", &lexicon).unwrap()
    }

    fn values(repr: &SemanticRepresentation) -> Vec<&str> {
        repr.units().iter().map(|u| u.value()).collect()
    }

    #[test]
    fn test_maps_known_forms() {
        let repr = analyze("Le roi conquiert le royaume");
        assert_eq!(values(&repr), vec!["Le", "roi", "√jñā", "le", "royaume"]);
        assert_eq!(repr.language(), Some("fr"));

        let verb = &repr.units()[2];
        assert_eq!(verb.unit_type(), UnitType::Dhatu);
        assert_eq!(verb.get("concept").and_then(MetaValue::as_str), Some("d6"));
        assert_eq!(verb.get("sense").and_then(MetaValue::as_int), Some(1));
        assert!(repr.units()[0].node().is_none());
    }

    #[test]
    fn test_links_agent_and_patient() {
        let repr = analyze("Le roi conquiert le royaume");
        let roi = repr.units()[1].node().unwrap();
        let verb = repr.units()[2].node().unwrap();
        let royaume = repr.units()[4].node().unwrap();
        assert_eq!(repr.graph().edges_of(roi, RelationType::Agent).next().map(|e| e.to), Some(verb));
        assert_eq!(repr.graph().edges_of(verb, RelationType::Patient).next().map(|e| e.to), Some(royaume));
    }

    #[test]
    fn test_longest_phrase_wins() {
        let repr = analyze("Il combat avec bravoure");
        assert_eq!(values(&repr), vec!["Il", "combat", "sāhasena"]);
        assert_eq!(repr.units()[2].unit_type(), UnitType::Idiom);
    }

    #[test]
    fn test_case_and_punctuation_are_ignored_for_lookup() {
        let repr = analyze("ROI, «royaume».");
        assert_eq!(values(&repr), vec!["roi", "royaume"]);
    }

    #[test]
    fn test_nul_tokens_stay_verbatim() {
        let repr = analyze("roi\0 royaume");
        assert_eq!(values(&repr), vec!["roi\0", "royaume"]);
        assert_eq!(repr.units()[0].unit_type(), UnitType::Pattern);
    }

    #[test]
    fn test_separators_are_kept() {
        let repr = analyze("  Le roi\tconquiert\n\nle royaume. ");
        assert_eq!(values(&repr), vec!["  ", "Le", "roi", "√jñā", "le", "royaume"]);
        let seps: Vec<_> = repr.units().iter().map(|u| u.separator()).collect();
        assert_eq!(seps, vec!["", " ", "\t", "\n\n", " ", " "]);
    }

    #[test]
    fn test_tokenize_reassembles() {
        let text = " \u{3000}un  deux\ttrois\n";
        let (leading, tokens) = tokenize(text);
        assert_eq!(leading, " \u{3000}");
        assert_eq!(tokens.len(), 3);
        let rebuilt: String = std::iter::once(leading)
            .chain(tokens.iter().flat_map(|t| [t.word, t.separator]))
            .collect();
        assert_eq!(rebuilt, text);
        assert_eq!(tokenize("   "), ("   ", Vec::new()));
    }

    #[test]
    fn test_analyze_within_keeps_tail_verbatim() {
        let lexicon = ConceptGraph::builtin().unwrap();
        let text = "le roi conquiert le royaume";
        // Limit falls inside "conquiert": the cut moves back to its start.
        let repr = GreedyAnalyzer::default().analyze_within(text, "fr", &lexicon, 9).unwrap();
        assert_eq!(values(&repr), vec!["le", "roi", "conquiert", "le", "royaume"]);
        assert_eq!(repr.graph().node_count(), 1);
        assert!(repr.units()[2..].iter().all(|u| u.unit_type() == UnitType::Pattern));

        let repr = GreedyAnalyzer::default().analyze_within("  roi ", "fr", &lexicon, 0).unwrap();
        assert_eq!(values(&repr), vec!["  ", "roi"]);
        assert_eq!(repr.graph().node_count(), 0);
    }

    #[test]
    fn test_append_verbatim_joins_whitespace() {
        let mut repr = SemanticRepresentation::new();
        let id = repr.add_unit(UnitType::Pattern, "a", false);
        repr.set_separator(id, " ").unwrap();
        append_verbatim(&mut repr, "\n b\tc").unwrap();
        assert_eq!(values(&repr), vec!["a", "b", "c"]);
        assert_eq!(repr.units()[0].separator(), " \n ");
        assert_eq!(repr.units()[1].separator(), "\t");
    }

    #[test]
    fn test_empty_text() {
        let repr = analyze("");
        assert!(repr.is_empty());
        assert_eq!(repr.graph().node_count(), 0);
    }
}
