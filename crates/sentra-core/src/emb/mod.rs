//! Embedding service abstractions.
//!
//! Text embeddings back the semantic cache: two clinical queries whose
//! vectors are close enough are answered from the same cached diagnosis.
//! Concrete providers (hosted embedding APIs) implement
//! [`EmbeddingProvider`]; callers go through [`EmbeddingService`], which
//! normalizes input and adds structured logging.

mod service;
mod similarity;

use async_trait::async_trait;
pub use service::EmbeddingService;
pub use similarity::{cosine_similarity, normalize_for_embedding};

use crate::{Result, ServiceHealth};

/// Tracing target for embedding operations.
pub const TRACING_TARGET: &str = "sentra_core::emb";

/// Core trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generates an embedding vector for a single (already normalized) input.
    async fn generate_embedding(&self, input: &str) -> Result<Vec<f32>>;

    /// Generates embeddings for several inputs, preserving order.
    ///
    /// Providers with a native batch endpoint should override this; the
    /// default issues one request per input.
    async fn generate_embedding_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(inputs.len());
        for input in inputs {
            vectors.push(self.generate_embedding(input).await?);
        }
        Ok(vectors)
    }

    /// Performs a health check on the embedding provider.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
