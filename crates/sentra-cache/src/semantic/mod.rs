//! Near-duplicate diagnosis cache over embedding vectors.
//!
//! A lookup embeds the query and returns the closest stored diagnosis when
//! its cosine similarity clears the configured threshold. The vector index is
//! in-process; embeddings come from any [`EmbeddingProvider`].
//!
//! [`EmbeddingProvider`]: sentra_core::emb::EmbeddingProvider

mod cache;
mod index;

pub use cache::{SemanticCache, SemanticCacheConfig, SemanticCacheStats, SemanticMatch};
pub use index::{SemanticEntry, entry_id};

/// Tracing target for semantic cache operations.
pub const TRACING_TARGET: &str = "sentra_cache::semantic";
