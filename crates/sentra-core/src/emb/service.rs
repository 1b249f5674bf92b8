//! Embedding service with observability.

use std::fmt;
use std::sync::Arc;

use jiff::Timestamp;

use super::{EmbeddingProvider, TRACING_TARGET, normalize_for_embedding};
use crate::{Result, ServiceHealth, Timing};

/// Embedding service wrapping any [`EmbeddingProvider`].
///
/// Inputs are normalized with [`normalize_for_embedding`] before they reach
/// the provider, and every call is logged with its latency.
#[derive(Clone)]
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
}

impl fmt::Debug for EmbeddingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingService").finish_non_exhaustive()
    }
}

impl EmbeddingService {
    /// Create a new embedding service from a provider.
    pub fn new<P>(provider: P) -> Self
    where
        P: EmbeddingProvider + 'static,
    {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Create a new embedding service from a shared provider.
    pub fn from_shared(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// Embeds a single query.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let started_at = Timestamp::now();
        let normalized = normalize_for_embedding(text);

        let result = self.provider.generate_embedding(&normalized).await;
        let elapsed = Timing::since(started_at);

        match &result {
            Ok(vector) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    dimensions = vector.len(),
                    elapsed_ms = elapsed.as_millis_f64(),
                    "embedding generated"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    elapsed_ms = elapsed.as_millis_f64(),
                    "embedding generation failed"
                );
            }
        }

        result
    }

    /// Embeds several queries in one provider call.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let started_at = Timestamp::now();
        let normalized: Vec<String> = texts.iter().map(|t| normalize_for_embedding(t)).collect();

        let result = self.provider.generate_embedding_batch(&normalized).await;
        let elapsed = Timing::since(started_at);

        match &result {
            Ok(vectors) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    count = vectors.len(),
                    elapsed_ms = elapsed.as_millis_f64(),
                    "batch embedding completed"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    batch_size = texts.len(),
                    error = %error,
                    elapsed_ms = elapsed.as_millis_f64(),
                    "batch embedding failed"
                );
            }
        }

        result
    }

    /// Checks the health of the underlying provider.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        self.provider.health_check().await
    }
}
