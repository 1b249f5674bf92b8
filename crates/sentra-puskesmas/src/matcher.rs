//! Name and symptom lookups over the disease table.

use std::path::Path;
use std::sync::Arc;

use crate::{DatasetError, DiseaseRecord, Result, TRACING_TARGET};

/// Disease table compiled into the crate.
const BUNDLED_TABLE: &str = include_str!("../data/med_database.json");

/// Minimum query length accepted by [`DiseaseMatcher::search_by_partial_name`].
const MIN_SEARCH_CHARS: usize = 2;

/// Immutable disease table with lookup operations.
///
/// Cloning shares the underlying records.
#[derive(Debug, Clone)]
pub struct DiseaseMatcher {
    records: Arc<[DiseaseRecord]>,
}

impl DiseaseMatcher {
    /// Loads the table bundled with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_TABLE)
    }

    /// Parses a JSON array of records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<DiseaseRecord> = serde_json::from_str(json)?;
        tracing::debug!(target: TRACING_TARGET, records = records.len(), "disease table loaded");
        Ok(Self::from_records(records))
    }

    /// Reads and parses a table file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(target: TRACING_TARGET, path = %path.display(), "loading disease table");
        Self::from_json_str(&json)
    }

    /// Wraps already parsed records.
    pub fn from_records(records: impl Into<Arc<[DiseaseRecord]>>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Every record in load order.
    pub fn list_all(&self) -> &[DiseaseRecord] {
        &self.records
    }

    /// Case-insensitive name lookup.
    ///
    /// An exact match wins; otherwise the first record whose name contains
    /// the input, or is contained in it.
    pub fn find_by_name(&self, name: &str) -> Option<&DiseaseRecord> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        self.records
            .iter()
            .find(|record| record.name.to_lowercase() == needle)
            .or_else(|| {
                self.records.iter().find(|record| {
                    let name = record.name.to_lowercase();
                    name.contains(&needle) || needle.contains(&name)
                })
            })
    }

    /// Best record by symptom overlap.
    ///
    /// A record scores one point per input symptom that overlaps (substring
    /// either way) any of its clinical symptoms. The earliest record with the
    /// highest non-zero score wins. Blank inputs are ignored.
    pub fn find_by_symptoms<S: AsRef<str>>(&self, symptoms: &[S]) -> Option<&DiseaseRecord> {
        let inputs: Vec<String> = symptoms
            .iter()
            .map(|symptom| symptom.as_ref().trim().to_lowercase())
            .filter(|symptom| !symptom.is_empty())
            .collect();
        if inputs.is_empty() {
            return None;
        }

        let mut best: Option<(&DiseaseRecord, usize)> = None;
        for record in self.records.iter() {
            let known: Vec<String> = record
                .clinical_symptoms
                .iter()
                .map(|symptom| symptom.to_lowercase())
                .collect();

            let score = inputs
                .iter()
                .filter(|input| {
                    known
                        .iter()
                        .any(|symptom| symptom.contains(input.as_str()) || input.contains(symptom.as_str()))
                })
                .count();

            if score > 0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((record, score));
            }
        }

        if let Some((record, score)) = best {
            tracing::debug!(target: TRACING_TARGET, disease = %record.name, score, "symptom match");
        }
        best.map(|(record, _)| record)
    }

    /// Whether the condition is in the table, i.e. manageable at Puskesmas level.
    pub fn can_be_treated_locally(&self, name: &str) -> bool {
        self.find_by_name(name).is_some()
    }

    /// Every record whose name contains `query`, case-insensitively.
    ///
    /// Queries shorter than two UTF-16 code units return nothing. The length
    /// is taken before trimming, so `" a"` searches for `"a"`.
    pub fn search_by_partial_name(&self, query: &str) -> Vec<&DiseaseRecord> {
        if query.encode_utf16().count() < MIN_SEARCH_CHARS {
            return Vec::new();
        }
        let needle = query.trim().to_lowercase();

        self.records
            .iter()
            .filter(|record| record.name.to_lowercase().contains(&needle))
            .collect()
    }
}
