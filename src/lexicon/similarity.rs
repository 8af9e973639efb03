//! Embedding similarity.
//!
//! Plain cosine over `f32` slices, accumulated in `f64`. A linear scan over
//! the lexicon is O(|nodes| · dim), fine for lexicon-scale graphs; a corpus-
//! scale lexicon would want an approximate nearest-neighbour index instead.

/// Cosine similarity of two equal-length vectors.
///
/// Returns 0.0 when either vector has zero norm, and `None` when the
/// lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Some(0.0);
    }
    Some((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = [0.5, 0.3, 0.8];
        let s = cosine_similarity(&v, &v).unwrap();
        assert!((s - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let s = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(s.abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        let s = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]).unwrap();
        assert!((s + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_norm_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), Some(0.0));
    }

    #[test]
    fn length_mismatch_is_none() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), None);
    }
}
