//! Mock embedding provider for testing.

use sentra_core::emb::EmbeddingProvider;
use sentra_core::{Error, Result, ServiceHealth};
use serde::{Deserialize, Serialize};

/// Configuration for the mock embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockEmbeddingConfig {
    /// Length of every generated vector.
    pub dimensions: usize,

    /// Fail every embedding request with a service-unavailable error.
    pub fail_requests: bool,

    /// Report the provider as unhealthy.
    pub unhealthy: bool,
}

impl Default for MockEmbeddingConfig {
    fn default() -> Self {
        Self {
            dimensions: 64,
            fail_requests: false,
            unhealthy: false,
        }
    }
}

/// Mock embedding provider for testing.
///
/// Each whitespace-separated token is hashed (FNV-1a) into one of
/// `dimensions` buckets, so equal inputs produce equal vectors and inputs
/// sharing no tokens are orthogonal.
#[derive(Clone, Default, Debug)]
pub struct MockEmbeddingProvider {
    config: MockEmbeddingConfig,
}

impl MockEmbeddingProvider {
    /// Creates a new mock embedding provider with the given configuration.
    pub fn new(config: MockEmbeddingConfig) -> Self {
        Self { config }
    }

    /// Creates a provider whose every request fails.
    pub fn failing() -> Self {
        Self::new(MockEmbeddingConfig {
            fail_requests: true,
            ..Default::default()
        })
    }

    /// Creates a provider that reports itself unhealthy.
    pub fn unhealthy() -> Self {
        Self::new(MockEmbeddingConfig {
            unhealthy: true,
            ..Default::default()
        })
    }

    fn embed(&self, input: &str) -> Vec<f32> {
        let dimensions = self.config.dimensions.max(1);
        let mut vector = vec![0.0; dimensions];

        for token in input.split_whitespace() {
            let bucket = fnv1a(token.as_bytes()) % dimensions as u64;
            vector[bucket as usize] += 1.0;
        }

        vector
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn generate_embedding(&self, input: &str) -> Result<Vec<f32>> {
        if self.config.fail_requests {
            return Err(Error::service_unavailable().with_message("mock embedding failure"));
        }

        Ok(self.embed(input))
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        if self.config.unhealthy {
            return Ok(ServiceHealth::unhealthy("mock embedding provider is down"));
        }

        Ok(ServiceHealth::healthy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn equal_inputs_embed_equally() {
        let provider = MockEmbeddingProvider::default();

        let a = provider.generate_embedding("demam tinggi").await.unwrap();
        let b = provider.generate_embedding("demam tinggi").await.unwrap();

        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
        assert_eq!(a.iter().sum::<f32>(), 2.0);
    }

    #[tokio::test]
    async fn failing_provider_errors() {
        let provider = MockEmbeddingProvider::failing();

        assert!(provider.generate_embedding("batuk").await.is_err());
        assert!(provider.health_check().await.unwrap().is_healthy());
    }
}
