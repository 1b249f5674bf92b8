//! In-process vector index.

use std::collections::BTreeMap;

use jiff::Timestamp;
use sentra_core::emb::cosine_similarity;

use crate::expiry::to_base36;

/// A stored query, its vector and the diagnosis it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticEntry<T> {
    pub id: String,
    pub vector: Vec<f32>,
    pub query: String,
    pub result: T,
    pub model: String,
    pub timestamp: Timestamp,
}

/// Deterministic entry id of a query.
///
/// The query is lowercased, trimmed and whitespace-collapsed, then hashed
/// with `h * 31 + c` over UTF-16 code units in 32-bit wrapping arithmetic.
pub fn entry_id(query: &str) -> String {
    let normalized = query
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let hash = normalized.encode_utf16().fold(0_i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });

    format!("diag_{}", to_base36(hash.unsigned_abs()))
}

/// Entries ordered by id, so ties in similarity resolve deterministically.
pub(crate) struct VectorIndex<T> {
    entries: BTreeMap<String, SemanticEntry<T>>,
}

impl<T> Default for VectorIndex<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> VectorIndex<T> {
    pub fn upsert(&mut self, entry: SemanticEntry<T>) {
        self.entries.insert(entry.id.clone(), entry);
    }

    pub fn remove(&mut self, id: &str) -> Option<SemanticEntry<T>> {
        self.entries.remove(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Vector length of the stored entries, if any.
    pub fn dimension(&self) -> Option<usize> {
        self.entries.values().next().map(|entry| entry.vector.len())
    }

    /// Top-1 cosine match. Entries whose similarity is undefined are skipped.
    pub fn nearest(&self, vector: &[f32]) -> Option<(&SemanticEntry<T>, f32)> {
        let mut best: Option<(&SemanticEntry<T>, f32)> = None;

        for entry in self.entries.values() {
            let Some(similarity) = cosine_similarity(vector, &entry.vector) else {
                continue;
            };
            if best.is_none_or(|(_, top)| similarity > top) {
                best = Some((entry, similarity));
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, vector: Vec<f32>) -> SemanticEntry<u8> {
        SemanticEntry {
            id: id.to_owned(),
            vector,
            query: id.to_owned(),
            result: 0,
            model: "m".to_owned(),
            timestamp: Timestamp::now(),
        }
    }

    #[test]
    fn ids_ignore_case_and_spacing() {
        assert_eq!(entry_id("Demam  Tinggi "), entry_id("demam tinggi"));
        assert!(entry_id("batuk").starts_with("diag_"));
        assert_eq!(entry_id(""), "diag_0");
        // "a" hashes to 97.
        assert_eq!(entry_id("A"), "diag_2p");
    }

    #[test]
    fn nearest_picks_highest_similarity() {
        let mut index = VectorIndex::default();
        index.upsert(entry("x", vec![1.0, 0.0]));
        index.upsert(entry("y", vec![0.6, 0.8]));

        let (best, similarity) = index.nearest(&[0.5, 0.9]).unwrap();

        assert_eq!(best.id, "y");
        assert!(similarity > 0.99);
        assert_eq!(index.dimension(), Some(2));
    }

    #[test]
    fn nearest_skips_incomparable_vectors() {
        let mut index = VectorIndex::default();
        index.upsert(entry("zero", vec![0.0, 0.0]));
        index.upsert(entry("short", vec![1.0]));

        assert!(index.nearest(&[1.0, 1.0]).is_none());
    }
}
