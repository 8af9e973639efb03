//! Reference inputs for the harness.

/// Mixed-script corpus: French, English, Sanskrit (Devanagari), repetitive,
/// emoji and long inputs.
pub fn standard_corpus() -> Vec<String> {
    vec![
        "Le roi conquiert le royaume avec bravoure.".to_string(),
        "The king conquers the kingdom with courage.".to_string(),
        "राजा साहसेन राज्यं जयति।".to_string(),
        "A".repeat(100),
        "Hello World! ".repeat(10),
        "Compression sémantique universelle basée sur les dhātu de Pāṇini.".to_string(),
        "Text with unicode: 🎯 📐 ✅ 🚀".to_string(),
        "Short".to_string(),
        "A".repeat(1000),
    ]
}

/// `(shorter, longer)` pairs for the monotonicity check.
pub fn monotonicity_pairs() -> Vec<(String, String)> {
    vec![
        ("Short text".to_string(), "Short text extended with more content".to_string()),
        ("A".repeat(10), "A".repeat(100)),
        ("Hello".to_string(), "Hello World! This is a longer sentence.".to_string()),
    ]
}
