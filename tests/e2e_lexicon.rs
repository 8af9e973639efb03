//! Lexicon loading, similarity bounds and representation invariants.

use std::sync::Arc;

use dhatu_codec::config::PipelineConfig;
use dhatu_codec::lexicon::functions::{lexical, morphology};
use dhatu_codec::lexicon::loader::builtin_lexicon;
use dhatu_codec::lexicon::LexiconFile;
use dhatu_codec::{
    ConceptGraph, ConceptNode, Error, RelationType, SemanticCodec, SemanticRepresentation, UnitType,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_lexicon_file_round_trip_on_disk() {
    let path = std::env::temp_dir().join(format!("dhatu-lexicon-{}.json", std::process::id()));
    let json = builtin_lexicon().to_json_pretty().unwrap();
    std::fs::write(&path, json).unwrap();

    let graph = ConceptGraph::from_path(&path).unwrap();
    let file = LexiconFile::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(graph.len(), file.concepts.len());
    assert_eq!(graph.to_lexicon(), ConceptGraph::builtin().unwrap().to_lexicon());
}

#[test]
fn test_missing_lexicon_file_is_io_error() {
    let err = ConceptGraph::from_path("/nonexistent/dhatu/lexicon.json").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_custom_lexicon_drives_compression() {
    let json = r#"{
        "version": 1,
        "dimension": 2,
        "concepts": [
            {"id": "v1", "root": "√pat", "gloss": "to fly", "embedding": [1.0, 0.0],
             "forms": ["vole", "flies"], "lexicalizations": {"fr": "vole"}},
            {"id": "e1", "root": "oiseau", "gloss": "bird", "kind": "entity",
             "embedding": [0.0, 1.0], "forms": ["oiseau", "bird"]}
        ]
    }"#;
    let lexicon = Arc::new(ConceptGraph::from_json_str(json).unwrap());
    let codec = SemanticCodec::new(lexicon, PipelineConfig::default());

    let text = "Un oiseau vole haut. The bird flies.";
    let artifact = codec.compress(text).unwrap();
    let repr = SemanticRepresentation::from_json(&artifact.semantic_payload).unwrap();
    let roots: Vec<_> = repr
        .units()
        .iter()
        .filter(|u| u.node().is_some())
        .map(|u| u.value())
        .collect();
    assert_eq!(roots, vec!["oiseau", "√pat", "oiseau", "√pat"]);
    assert_eq!(codec.decompress(&artifact).unwrap(), text);
}

#[test]
fn test_relation_on_nodeless_unit() {
    let mut repr = SemanticRepresentation::new();
    let article = repr.add_unit(UnitType::Pattern, "le", false);
    let king = repr.add_unit(UnitType::Entity, "roi", true);
    let err = repr.add_relation(article, king, RelationType::Agent).unwrap_err();
    assert!(matches!(err, Error::MissingGraphNode { unit } if unit == article));
    assert_eq!(repr.graph().edge_count(), 0);
}

#[test]
fn test_language_functions_over_builtin() {
    let graph = ConceptGraph::builtin().unwrap();
    let jna = graph.get(&"d6".into()).unwrap();
    assert_eq!(lexical::lexicalize(jna, "en"), "knows");
    assert_eq!(lexical::senses(jna), vec!["to know", "conquer"]);
    assert_eq!(morphology::inflect(jna, morphology::Features::default()), "jñāati");
}

#[test]
fn test_neighbors_are_plain_adjacency() {
    let graph = ConceptGraph::builtin().unwrap();
    let related: Vec<_> = graph.get_neighbors(&"e1".into()).iter().map(|n| n.id.0.clone()).collect();
    assert_eq!(related, vec!["e2"]);
    assert!(graph.get_neighbors(&"e2".into()).is_empty());
}

fn unit_vector() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1.0f32..1.0, 8)
}

proptest! {
    #[test]
    fn prop_find_similar_bounds(query in unit_vector(), top_k in 0usize..12, threshold in -1.0f32..1.0) {
        let graph = ConceptGraph::builtin().unwrap();
        let hits = graph.find_similar_scored(&query, top_k, threshold);
        prop_assert!(hits.len() <= top_k);
        for (_, score) in &hits {
            prop_assert!(*score >= threshold);
        }
        for pair in hits.windows(2) {
            prop_assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn prop_custom_nodes_keep_dimension(dim in 1usize..6, extra in 1usize..4) {
        let mut graph = ConceptGraph::new(dim);
        let ok = graph.add_node(ConceptNode::new("a", "√a", "", vec![0.5; dim]));
        prop_assert!(ok.is_ok());
        let bad = graph.add_node(ConceptNode::new("b", "√b", "", vec![0.5; dim + extra]));
        let is_dimension_mismatch = matches!(bad, Err(Error::DimensionMismatch { .. }));
        prop_assert!(is_dimension_mismatch);
    }
}
