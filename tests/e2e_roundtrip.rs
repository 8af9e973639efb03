//! End-to-end compression round trips: text → Artifact → text.
//!
//! Covers the codec contract over the builtin lexicon:
//!   ASCII, multi-script Unicode, empty input, long repetitive input,
//!   NUL and opcode-valued bytes, determinism, transport through export.

use std::sync::Arc;

use dhatu_codec::config::{DraftStrategy, PipelineConfig};
use dhatu_codec::export::{read_artifact, write_artifact};
use dhatu_codec::guide::decode;
use dhatu_codec::lexicon::ConceptNode;
use dhatu_codec::{
    Artifact, ConceptGraph, Error, GuideOperation, SemanticCodec, SemanticNodeId,
    SemanticRepresentation, SharedLexicon,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn codec() -> SemanticCodec {
    SemanticCodec::builtin().unwrap()
}

fn assert_round_trip(codec: &SemanticCodec, text: &str) -> Artifact {
    let artifact = codec.compress(text).unwrap();
    let restored = codec.decompress(&artifact).unwrap();
    assert_eq!(restored, text);
    artifact
}

#[test]
fn test_scenario_king_conquers_kingdom() {
    let codec = codec();
    let artifact = assert_round_trip(&codec, "Le roi conquiert le royaume");

    let repr = SemanticRepresentation::from_json(&artifact.semantic_payload).unwrap();
    let values: Vec<_> = repr.units().iter().map(|u| u.value()).collect();
    assert_eq!(values, vec!["Le", "roi", "√jñā", "le", "royaume"]);
    assert_eq!(repr.graph().node_count(), 3);
    assert_eq!(repr.graph().edge_count(), 2);

    let guide = decode(&artifact.guide).unwrap();
    assert_eq!(
        guide.operations,
        vec![
            GuideOperation::Replace { pos: 7, old_len: 8, text: "conquiert".into() },
            GuideOperation::Disambiguate { node_ref: SemanticNodeId(1), choice: 1 },
        ]
    );
}

#[test]
fn test_ascii_and_whitespace() {
    let codec = codec();
    for text in [
        "The king conquers the kingdom with courage.",
        "  leading and trailing  ",
        "tabs\tand\nnewlines\r\n",
        "Short",
        "!",
    ] {
        assert_round_trip(&codec, text);
    }
}

#[test]
fn test_multi_script_unicode() {
    let codec = codec();
    for text in [
        "राजा साहसेन राज्यं जयति।",
        "Compression sémantique universelle basée sur les dhātu de Pāṇini.",
        "Text with unicode: 🎯 📐 ✅ 🚀",
        "混合 text 与 émojis 👑 roi",
        "\u{feff}BOM then text",
    ] {
        assert_round_trip(&codec, text);
    }
}

#[test]
fn test_empty_input() {
    let artifact = assert_round_trip(&codec(), "");
    assert_eq!(artifact.stats.original_size, 0);
    assert_eq!(artifact.stats.ratio, None);
    assert_eq!(artifact.stats.savings_percent, None);
    assert!(decode(&artifact.guide).unwrap().operations.is_empty());
}

#[test]
fn test_long_repetitive_input() {
    let codec = codec();
    assert_round_trip(&codec, &"A".repeat(1000));
    assert_round_trip(&codec, &"Hello World! ".repeat(10));
    assert_round_trip(&codec, &"le roi conquiert ".repeat(200));
}

#[test]
fn test_nul_and_opcode_bytes_in_text() {
    let codec = codec();
    for text in [
        "roi\0royaume",
        "\0",
        "a \0 b",
        "le roi\0 conquiert",
        "\u{1}\u{2}\u{3}\u{10}\u{11}\u{20}\u{21}",
        "pos\u{1}\0\u{ff}",
    ] {
        assert_round_trip(&codec, text);
    }
}

#[test]
fn test_determinism_hundred_runs() {
    let codec = codec();
    let text = "Le roi conquiert le royaume avec bravoure.";
    let first = codec.compress(text).unwrap().to_bytes().unwrap();
    for _ in 0..100 {
        assert_eq!(codec.compress(text).unwrap().to_bytes().unwrap(), first);
    }
}

#[test]
fn test_lexicalizing_codec() {
    let lexicon = Arc::new(ConceptGraph::builtin().unwrap());
    let config = PipelineConfig { draft: DraftStrategy::Lexicalize, ..PipelineConfig::default() };
    let codec = SemanticCodec::new(lexicon, config);
    for (text, lang) in [
        ("Le roi conquiert le royaume", "fr"),
        ("The king gives the kingdom", "en"),
        ("Il combat avec bravoure", "fr"),
    ] {
        let artifact = codec.compress_with_language(text, lang).unwrap();
        assert_eq!(artifact.source_language, lang);
        assert_eq!(codec.decompress(&artifact).unwrap(), text);
    }
}

#[test]
fn test_transport_through_export() {
    let codec = codec();
    let text = "Le roi dit: « le royaume est grand »";
    let artifact = codec.compress(text).unwrap();

    let mut buf = Vec::new();
    write_artifact(&artifact, &mut buf).unwrap();
    let back = read_artifact(&mut buf.as_slice()).unwrap();

    assert_eq!(back, artifact);
    assert_eq!(codec.decompress(&back).unwrap(), text);
}

#[test]
fn test_tampered_guide_is_rejected() {
    let codec = codec();
    let mut artifact = codec.compress("Le roi conquiert le royaume").unwrap();
    // Flip one byte of the replacement text.
    let last_text_byte = artifact.guide.iter().rposition(|&b| b == b't').unwrap();
    artifact.guide[last_text_byte] = b'T';
    assert!(matches!(
        codec.decompress(&artifact),
        Err(Error::IntegrityMismatch { .. })
    ));
}

#[test]
fn test_truncated_guide_is_corrupt() {
    let codec = codec();
    let mut artifact = codec.compress("Le roi conquiert le royaume").unwrap();
    artifact.guide.truncate(artifact.guide.len() - 2);
    assert!(matches!(
        codec.decompress(&artifact),
        Err(Error::CorruptGuide { .. })
    ));
}

#[test]
fn test_long_prose_round_trips() {
    let codec = codec();
    let line = "The quick brown fox jumps over the lazy dog near the river bank.\n";
    let text = line.repeat(1700);
    assert!(text.len() >= 100_000);
    let artifact = assert_round_trip(&codec, &text);
    // Nothing mapped, separators kept: the draft already is the text.
    assert!(decode(&artifact.guide).unwrap().operations.is_empty());

    let mixed = "Le roi\tconquiert le royaume.\nThe king gives the kingdom!\r\n".repeat(2000);
    assert!(mixed.len() >= 100_000);
    assert_round_trip(&codec, &mixed);
}

#[test]
fn test_repeated_scenario_past_wire_width() {
    let codec = codec();
    for text in [
        "Le roi conquiert le royaume. ".repeat(2500),
        "Le roi conquiert le royaume ".repeat(4000),
    ] {
        let artifact = assert_round_trip(&codec, &text);
        assert!(artifact.guide.len() <= 3 + usize::from(u16::MAX));
    }
}

#[test]
fn test_nul_between_changed_runs() {
    let codec = codec();
    let text = format!("{}x\0y\t{}end", "roi\t".repeat(300), "royaume.\t".repeat(300));
    assert_round_trip(&codec, &text);
    let text = format!("{}x\0y\t{}end", "w\t".repeat(300), "w\t".repeat(300));
    assert_round_trip(&codec, &text);
}

#[test]
fn test_shared_lexicon_update_is_picked_up_by_new_codecs() {
    let shared = SharedLexicon::new(ConceptGraph::builtin().unwrap());
    let before = SemanticCodec::new(shared.snapshot(), PipelineConfig::default());

    shared
        .update(|g| {
            let id = g.add_node(ConceptNode::new("d7", "√likh", "to write", vec![0.1; 8]))?;
            g.add_surface_form("écrit", &id, 0)
        })
        .unwrap();
    let after = SemanticCodec::new(shared.snapshot(), PipelineConfig::default());

    let text = "Le roi écrit";
    let old = before.compress(text).unwrap();
    let new = after.compress(text).unwrap();
    assert!(!old.semantic_payload.contains("√likh"));
    assert!(new.semantic_payload.contains("√likh"));
    assert_eq!(before.decompress(&old).unwrap(), text);
    assert_eq!(after.decompress(&new).unwrap(), text);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_round_trip_any_text(text in "\\PC{0,120}|[a\\x00\\t\\n ]{0,60}") {
        let codec = codec();
        let artifact = codec.compress(&text).unwrap();
        prop_assert_eq!(codec.decompress(&artifact).unwrap(), text);
    }

    #[test]
    fn prop_round_trip_with_nul_and_separators(
        words in prop::collection::vec(
            prop::sample::select(vec![
                "roi", "royaume.", "conquiert", "x\0y", "\0", "le", "«roi»", "é\0",
            ]),
            0..40,
        ),
        seps in prop::collection::vec(prop::sample::select(vec![" ", "\t", "\n", "\r\n", "  "]), 40),
    ) {
        let mut text = String::new();
        for (word, sep) in words.iter().zip(&seps) {
            text.push_str(word);
            text.push_str(sep);
        }
        let codec = codec();
        let artifact = codec.compress(&text).unwrap();
        prop_assert_eq!(codec.decompress(&artifact).unwrap(), text);
    }

    #[test]
    fn prop_round_trip_lexicon_words(
        words in prop::collection::vec(
            prop::sample::select(vec![
                "Le", "le", "roi", "ROI,", "conquiert", "royaume.", "avec", "bravoure",
                "donne", "est", "is", "king", "\t", "«", "»", "राजा", "🚀",
            ]),
            0..24,
        ),
        sep in prop::sample::select(vec![" ", "  ", "\n", " \t "]),
    ) {
        let text = words.join(sep);
        let codec = codec();
        let artifact = codec.compress(&text).unwrap();
        prop_assert_eq!(codec.decompress(&artifact).unwrap(), text);
    }
}
