//! Language functions over lexicon nodes.
//!
//! Pure and stateless: each takes a [`ConceptNode`] plus arguments and
//! returns a value. Nothing here reads or writes the [`ConceptGraph`](super::ConceptGraph),
//! so a per-language implementation can replace any of them.

use super::ConceptNode;

/// Root without the `√` marker.
fn bare_root(node: &ConceptNode) -> &str {
    node.root.trim_start_matches('√')
}

// ============================================================================
// Morphology
// ============================================================================

pub mod morphology {
    use super::{bare_root, ConceptNode};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum Tense {
        #[default]
        Present,
        Past,
        Future,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum Person {
        First,
        Second,
        #[default]
        Third,
    }

    /// Inflection features.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Features {
        pub tense: Tense,
        pub person: Person,
    }

    /// Inflect a root with a simplified thematic paradigm.
    pub fn inflect(node: &ConceptNode, features: Features) -> String {
        let root = bare_root(node);
        match (features.tense, features.person) {
            (Tense::Present, Person::Third) => format!("{root}ati"),
            (Tense::Present, Person::Second) => format!("{root}asi"),
            (Tense::Present, Person::First) => format!("{root}āmi"),
            (Tense::Past, _) => format!("a{root}at"),
            (Tense::Future, _) => format!("{root}iṣyati"),
        }
    }

    /// Derivation (kṛt / taddhita): root + affix.
    pub fn derive(node: &ConceptNode, affix: &str) -> String {
        format!("{}{affix}", bare_root(node))
    }
}

// ============================================================================
// Syntax
// ============================================================================

pub mod syntax {
    use std::collections::BTreeMap;

    use super::ConceptNode;
    use crate::model::RelationType;

    /// Kāraka roles.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum Karaka {
        /// Agent.
        Kartr,
        /// Patient.
        Karman,
        /// Instrument.
        Karana,
        /// Recipient.
        Sampradana,
        /// Source.
        Apadana,
        /// Locus.
        Adhikarana,
    }

    impl Karaka {
        pub fn relation(self) -> RelationType {
            match self {
                Karaka::Kartr => RelationType::Agent,
                Karaka::Karman => RelationType::Patient,
                Karaka::Karana => RelationType::Instrument,
                Karaka::Sampradana => RelationType::Purpose,
                Karaka::Apadana => RelationType::Cause,
                Karaka::Adhikarana => RelationType::Location,
            }
        }
    }

    /// Vibhakti (grammatical case).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Vibhakti {
        Nominative,
        Accusative,
        Instrumental,
        Dative,
        Ablative,
        Locative,
    }

    /// Verb arguments by syntactic slot.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct Arguments {
        pub subject: Option<String>,
        pub object: Option<String>,
        pub instrument: Option<String>,
    }

    /// Assign kāraka roles to the arguments of a verb.
    pub fn assign_karaka(_verb: &ConceptNode, arguments: &Arguments) -> BTreeMap<Karaka, String> {
        let mut roles = BTreeMap::new();
        if let Some(s) = &arguments.subject {
            roles.insert(Karaka::Kartr, s.clone());
        }
        if let Some(o) = &arguments.object {
            roles.insert(Karaka::Karman, o.clone());
        }
        if let Some(i) = &arguments.instrument {
            roles.insert(Karaka::Karana, i.clone());
        }
        roles
    }

    /// Case selected by a role.
    pub fn select_vibhakti(role: Karaka) -> Vibhakti {
        match role {
            Karaka::Kartr => Vibhakti::Nominative,
            Karaka::Karman => Vibhakti::Accusative,
            Karaka::Karana => Vibhakti::Instrumental,
            Karaka::Sampradana => Vibhakti::Dative,
            Karaka::Apadana => Vibhakti::Ablative,
            Karaka::Adhikarana => Vibhakti::Locative,
        }
    }
}

// ============================================================================
// Lexical
// ============================================================================

pub mod lexical {
    use super::ConceptNode;
    use crate::model::MetaValue;

    /// Surface word for `language`; falls back to the root itself.
    pub fn lexicalize<'a>(node: &'a ConceptNode, language: &str) -> &'a str {
        node.metadata
            .get(&format!("lex.{language}"))
            .and_then(MetaValue::as_str)
            .unwrap_or(&node.root)
    }

    /// Senses listed in the gloss, trimmed.
    pub fn senses(node: &ConceptNode) -> Vec<&str> {
        node.gloss
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Pick a sense for a polysemous root. Context is not consulted yet, so
    /// the primary sense wins.
    pub fn disambiguate_polysemy<'a>(node: &'a ConceptNode, _context: &[&ConceptNode]) -> &'a str {
        senses(node).into_iter().next().unwrap_or("")
    }
}
