//! Metrics value types and their persisted form.

use jiff::Timestamp;
use sentra_core::{Error, Result};
use serde::{Deserialize, Serialize, Serializer};

use super::QueryKind;

/// Counters and running averages for one observation period.
///
/// Invariant: `total_queries == semantic_hits + exact_hits + misses` after
/// every call to [`CacheMetrics::record`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetrics {
    total_queries: u64,
    semantic_hits: u64,
    exact_hits: u64,
    misses: u64,
    avg_latency_hit: f64,
    avg_latency_miss: f64,
    avg_similarity: f64,
    #[serde(serialize_with = "serialize_epoch_millis")]
    period_start: Timestamp,
    #[serde(serialize_with = "serialize_epoch_millis")]
    period_end: Timestamp,
}

fn serialize_epoch_millis<S>(timestamp: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(timestamp.as_millisecond())
}

/// Incremental mean: folds `value` into `average` as the `count`-th sample.
fn running_average(average: f64, value: f64, count: u64) -> f64 {
    let count = count as f64;
    (average * (count - 1.0) + value) / count
}

/// Guarded ratio; an empty denominator yields zero.
fn ratio(numerator: u64, total: u64) -> f64 {
    numerator as f64 / total.max(1) as f64
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheMetrics {
    /// Creates empty metrics whose period starts and ends now.
    pub fn new() -> Self {
        let now = Timestamp::now();
        Self {
            total_queries: 0,
            semantic_hits: 0,
            exact_hits: 0,
            misses: 0,
            avg_latency_hit: 0.0,
            avg_latency_miss: 0.0,
            avg_similarity: 0.0,
            period_start: now,
            period_end: now,
        }
    }

    /// Records one lookup outcome.
    ///
    /// Hit latency averages over both hit kinds; similarity averages over
    /// semantic hits and is only updated when `similarity` is provided.
    /// Inputs are not validated.
    pub fn record(&mut self, kind: QueryKind, latency_ms: f64, similarity: Option<f64>) {
        self.total_queries += 1;

        match kind {
            QueryKind::SemanticHit => {
                self.semantic_hits += 1;
                self.avg_latency_hit =
                    running_average(self.avg_latency_hit, latency_ms, self.hits());
                if let Some(similarity) = similarity {
                    self.avg_similarity =
                        running_average(self.avg_similarity, similarity, self.semantic_hits);
                }
            }
            QueryKind::ExactHit => {
                self.exact_hits += 1;
                self.avg_latency_hit =
                    running_average(self.avg_latency_hit, latency_ms, self.hits());
            }
            QueryKind::Miss => {
                self.misses += 1;
                self.avg_latency_miss =
                    running_average(self.avg_latency_miss, latency_ms, self.misses);
            }
        }

        self.period_end = Timestamp::now();
    }

    /// Returns the metrics together with the derived rates.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.total_queries;
        let latency_improvement = if self.avg_latency_miss > 0.0 {
            (self.avg_latency_miss - self.avg_latency_hit) / self.avg_latency_miss * 100.0
        } else {
            0.0
        };

        MetricsSnapshot {
            hit_rate: ratio(self.hits(), total),
            semantic_hit_rate: ratio(self.semantic_hits, total),
            exact_hit_rate: ratio(self.exact_hits, total),
            miss_rate: ratio(self.misses, total),
            latency_improvement,
            metrics: self.clone(),
        }
    }

    /// Parses a previously exported document.
    ///
    /// Derived fields are ignored. Missing or zero counters and averages
    /// become zero; missing or zero timestamps become now.
    pub fn from_json(serialized: &str) -> Result<Self> {
        let persisted: PersistedMetrics = serde_json::from_str(serialized)?;
        let now = Timestamp::now();

        Ok(Self {
            total_queries: persisted.total_queries.unwrap_or_default(),
            semantic_hits: persisted.semantic_hits.unwrap_or_default(),
            exact_hits: persisted.exact_hits.unwrap_or_default(),
            misses: persisted.misses.unwrap_or_default(),
            avg_latency_hit: persisted.avg_latency_hit.unwrap_or_default(),
            avg_latency_miss: persisted.avg_latency_miss.unwrap_or_default(),
            avg_similarity: persisted.avg_similarity.unwrap_or_default(),
            period_start: epoch_millis_or(persisted.period_start, now)?,
            period_end: epoch_millis_or(persisted.period_end, now)?,
        })
    }

    /// Total lookups recorded in this period.
    pub fn total_queries(&self) -> u64 {
        self.total_queries
    }

    /// Lookups answered by the semantic cache.
    pub fn semantic_hits(&self) -> u64 {
        self.semantic_hits
    }

    /// Lookups answered by the exact-match cache.
    pub fn exact_hits(&self) -> u64 {
        self.exact_hits
    }

    /// Lookups that reached the language model.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Hits of either kind.
    pub fn hits(&self) -> u64 {
        self.semantic_hits + self.exact_hits
    }

    /// Mean latency of hits, in milliseconds.
    pub fn avg_latency_hit(&self) -> f64 {
        self.avg_latency_hit
    }

    /// Mean latency of misses, in milliseconds.
    pub fn avg_latency_miss(&self) -> f64 {
        self.avg_latency_miss
    }

    /// Mean similarity of semantic hits.
    pub fn avg_similarity(&self) -> f64 {
        self.avg_similarity
    }

    /// When the period started (creation, reset or import).
    pub fn period_start(&self) -> Timestamp {
        self.period_start
    }

    /// When the last lookup was recorded.
    pub fn period_end(&self) -> Timestamp {
        self.period_end
    }
}

fn epoch_millis_or(millis: Option<i64>, fallback: Timestamp) -> Result<Timestamp> {
    match millis {
        None | Some(0) => Ok(fallback),
        Some(millis) => Timestamp::from_millisecond(millis).map_err(|error| {
            Error::invalid_input()
                .with_message(format!("timestamp {millis} is out of range"))
                .with_source(error)
        }),
    }
}

/// Metrics plus derived rates; the export format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    #[serde(flatten)]
    pub metrics: CacheMetrics,
    /// `(semantic_hits + exact_hits) / total_queries`.
    pub hit_rate: f64,
    pub semantic_hit_rate: f64,
    pub exact_hit_rate: f64,
    pub miss_rate: f64,
    /// Percentage by which hits are faster than misses.
    pub latency_improvement: f64,
}

/// Lenient view of an exported document.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedMetrics {
    total_queries: Option<u64>,
    semantic_hits: Option<u64>,
    exact_hits: Option<u64>,
    misses: Option<u64>,
    avg_latency_hit: Option<f64>,
    avg_latency_miss: Option<f64>,
    avg_similarity: Option<f64>,
    period_start: Option<i64>,
    period_end: Option<i64>,
}
