//! In-memory exact-match cache.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{TRACING_TARGET, query_key};
use crate::expiry::{DEFAULT_TTL, is_expired};

/// Default maximum number of cached queries.
const DEFAULT_MAX_ENTRIES: usize = 100;

/// Query cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCacheConfig {
    /// How long an entry stays valid after it was stored.
    pub ttl: Duration,
    /// Maximum number of entries; the oldest are evicted beyond it.
    pub max_entries: usize,
}

impl QueryCacheConfig {
    /// Creates a configuration with the given TTL and capacity.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self { ttl, max_entries }
    }

    /// Sets the entry time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the maximum number of entries.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}

/// A cached diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryCacheEntry<T> {
    pub result: T,
    /// When the entry was stored.
    pub timestamp: Timestamp,
    pub query_hash: String,
    /// Query exactly as the caller passed it to [`QueryCache::set`].
    pub original_query: String,
    /// Model that produced `result`.
    pub model: String,
}

/// Entry count and age of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCacheStats {
    pub entries: usize,
    pub oldest_entry: Option<Timestamp>,
}

struct Slot<T> {
    entry: QueryCacheEntry<T>,
    /// Insertion order; breaks timestamp ties during eviction.
    sequence: u64,
}

struct Store<T> {
    slots: HashMap<String, Slot<T>>,
    next_sequence: u64,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            next_sequence: 0,
        }
    }
}

/// Exact-match cache keyed by [`query_key`].
pub struct QueryCache<T> {
    store: Arc<RwLock<Store<T>>>,
    config: QueryCacheConfig,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config,
        }
    }
}

impl<T> fmt::Debug for QueryCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new(QueryCacheConfig::default())
    }
}

impl<T> QueryCache<T> {
    /// Creates an empty cache.
    pub fn new(config: QueryCacheConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::default())),
            config,
        }
    }

    /// Returns the cache configuration.
    pub fn config(&self) -> QueryCacheConfig {
        self.config
    }

    /// Stores `result` for `query`, replacing any previous entry.
    pub async fn set(&self, query: &str, result: T, model: &str) {
        let query_hash = query_key(query);
        let entry = QueryCacheEntry {
            result,
            timestamp: Timestamp::now(),
            query_hash: query_hash.clone(),
            original_query: query.to_owned(),
            model: model.to_owned(),
        };

        let mut store = self.store.write().await;
        let sequence = store.next_sequence;
        store.next_sequence += 1;
        store.slots.insert(query_hash.clone(), Slot { entry, sequence });
        let evicted = Self::enforce_limit(&mut store, self.config.max_entries);

        tracing::debug!(
            target: TRACING_TARGET,
            query_hash = %query_hash,
            model,
            evicted,
            "diagnosis cached"
        );
    }

    /// Removes the oldest entries until at most `max_entries` remain.
    fn enforce_limit(store: &mut Store<T>, max_entries: usize) -> usize {
        let excess = store.slots.len().saturating_sub(max_entries);
        if excess == 0 {
            return 0;
        }

        let mut by_age: Vec<(Timestamp, u64, String)> = store
            .slots
            .iter()
            .map(|(key, slot)| (slot.entry.timestamp, slot.sequence, key.clone()))
            .collect();
        by_age.sort_unstable();

        for (_, _, key) in by_age.into_iter().take(excess) {
            store.slots.remove(&key);
        }
        excess
    }

    /// Removes one query, or every entry when `query` is `None`.
    pub async fn invalidate(&self, query: Option<&str>) {
        let mut store = self.store.write().await;

        match query {
            Some(query) => {
                let query_hash = query_key(query);
                store.slots.remove(&query_hash);
                tracing::debug!(target: TRACING_TARGET, query_hash = %query_hash, "query invalidated");
            }
            None => {
                store.slots.clear();
                tracing::info!(target: TRACING_TARGET, "query cache cleared");
            }
        }
    }

    /// Removes every entry produced by `model` and returns how many.
    pub async fn invalidate_by_model(&self, model: &str) -> usize {
        let mut store = self.store.write().await;
        let before = store.slots.len();
        store.slots.retain(|_, slot| slot.entry.model != model);
        let removed = before - store.slots.len();

        tracing::info!(target: TRACING_TARGET, model, removed, "model entries invalidated");
        removed
    }

    /// Removes every expired entry and returns how many.
    pub async fn purge_expired(&self) -> usize {
        let now = Timestamp::now();
        let ttl = self.config.ttl;

        let mut store = self.store.write().await;
        let before = store.slots.len();
        store
            .slots
            .retain(|_, slot| !is_expired(slot.entry.timestamp, ttl, now));
        let removed = before - store.slots.len();

        if removed > 0 {
            tracing::debug!(
                target: TRACING_TARGET,
                removed,
                remaining = store.slots.len(),
                "expired entries purged"
            );
        }
        removed
    }

    /// Returns the entry count and the oldest entry timestamp.
    pub async fn stats(&self) -> QueryCacheStats {
        let store = self.store.read().await;
        QueryCacheStats {
            entries: store.slots.len(),
            oldest_entry: store.slots.values().map(|slot| slot.entry.timestamp).min(),
        }
    }
}

impl<T: Clone> QueryCache<T> {
    /// Returns the entry for `query` if present and younger than the TTL.
    ///
    /// Expired entries are removed on access.
    pub async fn get(&self, query: &str) -> Option<QueryCacheEntry<T>> {
        let query_hash = query_key(query);
        let mut store = self.store.write().await;

        let expired = {
            let slot = store.slots.get(&query_hash)?;
            is_expired(slot.entry.timestamp, self.config.ttl, Timestamp::now())
        };

        if expired {
            store.slots.remove(&query_hash);
            tracing::debug!(target: TRACING_TARGET, query_hash = %query_hash, "cached query expired");
            return None;
        }

        tracing::debug!(target: TRACING_TARGET, query_hash = %query_hash, "query cache hit");
        store.slots.get(&query_hash).map(|slot| slot.entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn normalized_variants_hit_the_same_entry() {
        let cache = QueryCache::default();
        cache.set("Demam tinggi, 3 hari.", 1_u32, "deepseek").await;

        let entry = cache.get("demam   TINGGI 3 hari").await.unwrap();

        assert_eq!(entry.result, 1);
        assert_eq!(entry.model, "deepseek");
        assert_eq!(entry.original_query, "Demam tinggi, 3 hari.");
        assert!(cache.get("demam ringan").await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_misses_and_removed() {
        let cache = QueryCache::new(QueryCacheConfig::default().with_ttl(Duration::ZERO));
        cache.set("batuk", "x".to_owned(), "qwen").await;

        assert!(cache.get("batuk").await.is_none());
        assert_eq!(cache.stats().await.entries, 0);
    }

    #[tokio::test]
    async fn capacity_evicts_oldest() {
        let cache = QueryCache::new(QueryCacheConfig::default().with_max_entries(2));
        cache.set("satu", 1, "m").await;
        cache.set("dua", 2, "m").await;
        cache.set("tiga", 3, "m").await;

        assert!(cache.get("satu").await.is_none());
        assert_eq!(cache.get("dua").await.map(|e| e.result), Some(2));
        assert_eq!(cache.get("tiga").await.map(|e| e.result), Some(3));
    }

    #[tokio::test]
    async fn invalidation_by_query_model_and_all() {
        let cache = QueryCache::default();
        cache.set("a query", 1, "glm").await;
        cache.set("b query", 2, "qwen").await;
        cache.set("c query", 3, "qwen").await;

        assert_eq!(cache.invalidate_by_model("qwen").await, 2);
        assert!(cache.get("a query").await.is_some());

        cache.invalidate(Some("A QUERY")).await;
        assert!(cache.get("a query").await.is_none());

        cache.set("d query", 4, "glm").await;
        cache.invalidate(None).await;
        assert_eq!(cache.stats().await.entries, 0);
    }

    #[tokio::test]
    async fn stats_report_oldest_entry() {
        let cache = QueryCache::default();
        assert_eq!(cache.stats().await.oldest_entry, None);

        cache.set("first", 1, "m").await;
        let oldest = cache.get("first").await.unwrap().timestamp;
        cache.set("second", 2, "m").await;

        let stats = cache.stats().await;
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.oldest_entry, Some(oldest));
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let cache: QueryCache<u8> = QueryCache::new(QueryCacheConfig::default().with_ttl(Duration::ZERO));
        cache.set("x", 1, "m").await;

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.purge_expired().await, 0);
    }
}
