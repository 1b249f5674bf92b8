//! Language-model service with observability.

use std::fmt;
use std::sync::Arc;

use jiff::Timestamp;

use super::{CompletionRequest, CompletionResponse, LanguageModelProvider, TRACING_TARGET};
use crate::{Result, ServiceHealth, Timing};

/// Language-model service wrapping any [`LanguageModelProvider`].
#[derive(Clone)]
pub struct LanguageModelService {
    provider: Arc<dyn LanguageModelProvider>,
}

impl fmt::Debug for LanguageModelService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageModelService").finish_non_exhaustive()
    }
}

impl LanguageModelService {
    /// Create a new language-model service from a provider.
    pub fn new<P>(provider: P) -> Self
    where
        P: LanguageModelProvider + 'static,
    {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Create a new language-model service from a shared provider.
    pub fn from_shared(provider: Arc<dyn LanguageModelProvider>) -> Self {
        Self { provider }
    }

    /// Sends a completion request.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let started_at = Timestamp::now();

        tracing::debug!(
            target: TRACING_TARGET,
            model = %request.model,
            messages = request.messages.len(),
            temperature = request.temperature,
            "sending completion request"
        );

        let result = self.provider.complete(request).await;
        let elapsed = Timing::since(started_at);

        match &result {
            Ok(response) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    model = %response.model,
                    content_len = response.content.len(),
                    elapsed_ms = elapsed.as_millis_f64(),
                    "completion received"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    model = %request.model,
                    error = %error,
                    elapsed_ms = elapsed.as_millis_f64(),
                    "completion failed"
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
