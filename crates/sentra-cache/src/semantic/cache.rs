//! Semantic cache handle.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use sentra_core::emb::EmbeddingService;
use sentra_core::{ServiceHealth, Timing};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::index::VectorIndex;
use super::{SemanticEntry, TRACING_TARGET, entry_id};
use crate::expiry::{DEFAULT_TTL, is_expired};

/// Default minimum cosine similarity for a hit.
const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.95;

/// Similarity function reported by [`SemanticCache::stats`].
const SIMILARITY_FUNCTION: &str = "COSINE";

/// Semantic cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemanticCacheConfig {
    /// Minimum cosine similarity (0.0 to 1.0) for a lookup to hit.
    pub similarity_threshold: f32,
    /// How long an entry stays valid after it was stored.
    pub ttl: Duration,
}

impl SemanticCacheConfig {
    /// Sets the similarity threshold.
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Sets the entry time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            ttl: DEFAULT_TTL,
        }
    }
}

/// A cached diagnosis matched by similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticMatch<T> {
    /// The earlier query the result was produced for.
    pub query: String,
    pub result: T,
    pub model: String,
    pub similarity: f64,
}

/// Index size and shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticCacheStats {
    pub total_entries: usize,
    /// Vector length, `None` while the index is empty.
    pub dimension: Option<usize>,
    pub similarity_function: String,
}

/// Near-duplicate cache over query embeddings.
///
/// Embedding failures never surface to callers: lookups degrade to a miss
/// and writes are skipped, both with a log line.
pub struct SemanticCache<T> {
    embeddings: EmbeddingService,
    index: Arc<RwLock<VectorIndex<T>>>,
    config: SemanticCacheConfig,
}

impl<T> Clone for SemanticCache<T> {
    fn clone(&self) -> Self {
        Self {
            embeddings: self.embeddings.clone(),
            index: Arc::clone(&self.index),
            config: self.config,
        }
    }
}

impl<T> fmt::Debug for SemanticCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync> SemanticCache<T> {
    /// Creates an empty cache backed by `embeddings`.
    pub fn new(embeddings: EmbeddingService, config: SemanticCacheConfig) -> Self {
        Self {
            embeddings,
            index: Arc::new(RwLock::new(VectorIndex::default())),
            config,
        }
    }

    /// Returns the cache configuration.
    pub fn config(&self) -> SemanticCacheConfig {
        self.config
    }

    /// Looks up the closest earlier query.
    ///
    /// Misses when the index is empty, the best similarity is below the
    /// threshold, the best entry has expired (it is then removed) or the
    /// query cannot be embedded.
    pub async fn get(&self, query: &str) -> Option<SemanticMatch<T>> {
        let started_at = Timestamp::now();

        let vector = match self.embeddings.embed(query).await {
            Ok(vector) => vector,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "semantic lookup skipped, embedding failed"
                );
                return None;
            }
        };

        let mut index = self.index.write().await;

        let Some((entry, similarity)) = index.nearest(&vector) else {
            tracing::debug!(target: TRACING_TARGET, "semantic miss, no comparable entries");
            return None;
        };

        if similarity < self.config.similarity_threshold {
            tracing::debug!(
                target: TRACING_TARGET,
                similarity,
                threshold = self.config.similarity_threshold,
                "semantic miss, similarity below threshold"
            );
            return None;
        }

        if is_expired(entry.timestamp, self.config.ttl, Timestamp::now()) {
            let id = entry.id.clone();
            index.remove(&id);
            tracing::debug!(target: TRACING_TARGET, id = %id, "semantic miss, entry expired");
            return None;
        }

        let found = SemanticMatch {
            query: entry.query.clone(),
            result: entry.result.clone(),
            model: entry.model.clone(),
            similarity: f64::from(similarity),
        };

        tracing::debug!(
            target: TRACING_TARGET,
            id = %entry.id,
            similarity,
            elapsed_ms = Timing::since(started_at).as_millis_f64(),
            "semantic hit"
        );

        Some(found)
    }

    /// Embeds `query` and upserts it under its deterministic id.
    pub async fn set(&self, query: &str, result: T, model: &str) {
        let vector = match self.embeddings.embed(query).await {
            Ok(vector) => vector,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "semantic store skipped, embedding failed"
                );
                return;
            }
        };

        let id = entry_id(query);
        self.index.write().await.upsert(SemanticEntry {
            id: id.clone(),
            vector,
            query: query.to_owned(),
            result,
            model: model.to_owned(),
            timestamp: Timestamp::now(),
        });

        tracing::debug!(target: TRACING_TARGET, id = %id, model, "semantic entry stored");
    }

    /// Pre-populates the cache with `(query, result, model)` triples using a
    /// single batch embedding call. Returns the number of entries stored.
    pub async fn warm(&self, entries: Vec<(String, T, String)>) -> usize {
        if entries.is_empty() {
            return 0;
        }

        let queries: Vec<String> = entries.iter().map(|(query, ..)| query.clone()).collect();
        let vectors = match self.embeddings.embed_batch(&queries).await {
            Ok(vectors) if vectors.len() == entries.len() => vectors,
            Ok(vectors) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    expected = entries.len(),
                    received = vectors.len(),
                    "cache warm-up skipped, embedding count mismatch"
                );
                return 0;
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "cache warm-up skipped, embedding failed"
                );
                return 0;
            }
        };

        let now = Timestamp::now();
        let mut index = self.index.write().await;
        let stored = entries.len();
        for ((query, result, model), vector) in entries.into_iter().zip(vectors) {
            index.upsert(SemanticEntry {
                id: entry_id(&query),
                vector,
                query,
                result,
                model,
                timestamp: now,
            });
        }

        tracing::info!(target: TRACING_TARGET, stored, "semantic cache warmed");
        stored
    }

    /// Removes the entry with `id`. Returns whether it existed.
    pub async fn invalidate(&self, id: &str) -> bool {
        let removed = self.index.write().await.remove(id).is_some();
        tracing::debug!(target: TRACING_TARGET, id, removed, "semantic entry invalidated");
        removed
    }

    /// Removes every entry.
    pub async fn clear(&self) {
        self.index.write().await.clear();
        tracing::info!(target: TRACING_TARGET, "semantic cache cleared");
    }

    /// Returns the index size and shape.
    pub async fn stats(&self) -> SemanticCacheStats {
        let index = self.index.read().await;
        SemanticCacheStats {
            total_entries: index.len(),
            dimension: index.dimension(),
            similarity_function: SIMILARITY_FUNCTION.to_owned(),
        }
    }

    /// Reports the cache and its embedding dependency.
    ///
    /// Healthy only when the embedding provider reports healthy.
    pub async fn health(&self) -> ServiceHealth {
        let started_at = Timestamp::now();
        let embeddings_healthy = match self.embeddings.health_check().await {
            Ok(health) => health.is_healthy(),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "embedding health check failed"
                );
                false
            }
        };
        let total_entries = self.index.read().await.len();

        let health = if embeddings_healthy {
            ServiceHealth::healthy()
        } else {
            ServiceHealth::degraded("embedding provider unavailable")
        };

        let response = Timing::since(started_at).duration().unsigned_abs();
        health
            .with_response_time(response)
            .with_metric("embeddings", embeddings_healthy)
            .with_metric("vector_store", true)
            .with_metric("total_entries", total_entries)
    }
}
