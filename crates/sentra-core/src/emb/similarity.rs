//! Text normalization and vector similarity.

/// Maximum number of characters sent to the embedding provider.
const MAX_INPUT_CHARS: usize = 500;

/// Normalizes a query before embedding so that trivially different
/// phrasings map to the same vector.
///
/// Lowercases, trims, collapses whitespace runs, strips every character that
/// is not an ASCII word character or whitespace, and truncates to 500
/// characters.
pub fn normalize_for_embedding(text: &str) -> String {
    let lowered = text.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    collapsed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .take(MAX_INPUT_CHARS)
        .collect()
}

/// Computes the cosine similarity of two vectors.
///
/// Returns `None` if the vectors have different dimensions or if either has
/// zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
    let magnitude_a = a.iter().map(|&x| x * x).sum::<f32>().sqrt();
    let magnitude_b = b.iter().map(|&y| y * y).sum::<f32>().sqrt();

    let magnitude_product = magnitude_a * magnitude_b;
    if magnitude_product > 0.0 {
        Some(dot_product / magnitude_product)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_case_space_and_punctuation() {
        assert_eq!(
            normalize_for_embedding("  Demam   TINGGI, batuk!\tsesak  "),
            "demam tinggi batuk sesak"
        );
    }

    #[test]
    fn normalization_truncates_long_input() {
        let long = "a".repeat(800);
        assert_eq!(normalize_for_embedding(&long).len(), 500);
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.2, 0.4, 0.4];
        let similarity = cosine_similarity(&v, &v).unwrap();
        assert!((similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), Some(0.0));
    }

    #[test]
    fn cosine_rejects_mismatched_or_zero_vectors() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), None);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), None);
    }
}
