//! Diagnosis pipeline orchestration.

use jiff::Timestamp;
use sentra_cache::{MetricsTracker, QueryCache, QueryKind, SemanticCache};
use sentra_core::llm::{ChatMessage, CompletionRequest, LanguageModelService};
use sentra_core::types::DiagnosisResult;
use sentra_core::{Error, Result, ServiceHealth, Timing};

use super::{
    DiagnosisResponse, FALLBACK_CHAIN, FailureClass, GenerateOptions, ModelKey,
    ResponseMetadata, SYSTEM_INSTRUCTION, TRACING_TARGET, build_prompt, parse_diagnosis,
};
use crate::circuit::{CircuitBreaker, CircuitError, CircuitState};

/// Accepted query length, in characters after trimming.
const QUERY_CHARS: std::ops::RangeInclusive<usize> = 3..=500;

/// Sampling temperature used when the caller sets none.
const DEFAULT_TEMPERATURE: f32 = 0.05;

const ALL_CIRCUITS_OPEN: &str = "All AI models temporarily unavailable. Please try again in 30 seconds.";

/// Cache-first diagnosis generation with model fallback.
///
/// Cloning shares the caches, circuit breaker and metrics tracker.
#[derive(Debug, Clone)]
pub struct DiagnosisPipeline {
    llm: LanguageModelService,
    breaker: CircuitBreaker,
    exact: QueryCache<DiagnosisResult>,
    semantic: Option<SemanticCache<DiagnosisResult>>,
    metrics: MetricsTracker,
}

impl DiagnosisPipeline {
    /// Creates a pipeline with default caches and breaker and no semantic
    /// cache.
    pub fn new(llm: LanguageModelService, metrics: MetricsTracker) -> Self {
        Self {
            llm,
            breaker: CircuitBreaker::default(),
            exact: QueryCache::default(),
            semantic: None,
            metrics,
        }
    }

    /// Replaces the exact-match cache.
    pub fn with_query_cache(mut self, cache: QueryCache<DiagnosisResult>) -> Self {
        self.exact = cache;
        self
    }

    /// Enables the semantic cache.
    pub fn with_semantic_cache(mut self, cache: SemanticCache<DiagnosisResult>) -> Self {
        self.semantic = Some(cache);
        self
    }

    /// Replaces the circuit breaker.
    pub fn with_circuit_breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.breaker = breaker;
        self
    }

    /// The circuit breaker guarding model calls.
    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// The exact-match cache.
    pub fn query_cache(&self) -> &QueryCache<DiagnosisResult> {
        &self.exact
    }

    /// The semantic cache, if enabled.
    pub fn semantic_cache(&self) -> Option<&SemanticCache<DiagnosisResult>> {
        self.semantic.as_ref()
    }

    /// The metrics tracker every lookup is recorded in.
    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }

    /// Generates a diagnosis for `query`.
    ///
    /// Only invalid input is an `Err`; model failures are reported as an
    /// unsuccessful [`DiagnosisResponse`].
    pub async fn generate(&self, query: &str, options: GenerateOptions) -> Result<DiagnosisResponse> {
        let query = query.trim();
        let temperature = validate(query, options.temperature)?;
        let started_at = Timestamp::now();

        if !options.skip_cache
            && let Some(response) = self.lookup_cached(query, started_at).await
        {
            return Ok(response);
        }

        let mut last_error = None;

        if let Some(model) = options.model
            && self.breaker.can_execute(model.circuit_key()).await
        {
            tracing::debug!(target: TRACING_TARGET, model = %model, "trying requested model");
            match self.attempt(model, query, temperature).await {
                Ok(result) => return Ok(self.complete(query, model, result, started_at).await),
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        model = %model,
                        error = %error,
                        "requested model failed, trying fallback chain"
                    );
                    last_error = Some(error);
                }
            }
        }

        let mut healthy = Vec::with_capacity(FALLBACK_CHAIN.len());
        for model in FALLBACK_CHAIN {
            if self.breaker.can_execute(model.circuit_key()).await {
                healthy.push(model);
            }
        }

        if healthy.is_empty() {
            tracing::error!(target: TRACING_TARGET, "all model circuits open");
            return Ok(DiagnosisResponse::failure(
                ALL_CIRCUITS_OPEN,
                uncached_metadata(None, started_at),
            ));
        }

        for (attempt, model) in healthy.iter().copied().enumerate() {
            tracing::debug!(
                target: TRACING_TARGET,
                model = %model,
                attempt = attempt + 1,
                of = healthy.len(),
                "trying model"
            );

            match self.attempt(model, query, temperature).await {
                Ok(result) => return Ok(self.complete(query, model, result, started_at).await),
                Err(error) => {
                    tracing::warn!(target: TRACING_TARGET, model = %model, error = %error, "model failed");
                    last_error = Some(error);
                }
            }
        }

        let class = last_error
            .as_ref()
            .map_or(FailureClass::UnknownError, FailureClass::classify);
        tracing::error!(target: TRACING_TARGET, class = %class, "all models failed");

        Ok(DiagnosisResponse::failure(
            format!("All AI models failed: {class}. Please try again."),
            uncached_metadata(None, started_at),
        ))
    }

    async fn lookup_cached(&self, query: &str, started_at: Timestamp) -> Option<DiagnosisResponse> {
        if let Some(entry) = self.exact.get(query).await {
            let latency_ms = Timing::since(started_at).as_millis_f64();
            self.metrics
                .record_query(QueryKind::ExactHit, latency_ms, None)
                .await;

            tracing::info!(target: TRACING_TARGET, latency_ms, "exact cache hit");
            let metadata = ResponseMetadata {
                from_cache: true,
                model: Some(entry.model),
                similarity: None,
                latency_ms,
                timestamp: Timestamp::now(),
            };
            return Some(DiagnosisResponse::success(entry.result, metadata));
        }

        let found = self.semantic.as_ref()?.get(query).await?;
        let latency_ms = Timing::since(started_at).as_millis_f64();
        self.metrics
            .record_query(QueryKind::SemanticHit, latency_ms, Some(found.similarity))
            .await;

        tracing::info!(
            target: TRACING_TARGET,
            latency_ms,
            similarity = found.similarity,
            "semantic cache hit"
        );
        let metadata = ResponseMetadata {
            from_cache: true,
            model: Some(found.model),
            similarity: Some(found.similarity),
            latency_ms,
            timestamp: Timestamp::now(),
        };
        Some(DiagnosisResponse::success(found.result, metadata))
    }

    /// One guarded model call.
    async fn attempt(&self, model: ModelKey, query: &str, temperature: f32) -> Result<DiagnosisResult> {
        let request = CompletionRequest::new(model.id())
            .with_message(ChatMessage::system(SYSTEM_INSTRUCTION))
            .with_message(ChatMessage::user(build_prompt(query)))
            .with_temperature(temperature);

        let outcome = self
            .breaker
            .execute(model.circuit_key(), || async {
                let response = self.llm.complete(&request).await?;
                parse_diagnosis(&response.content)
            })
            .await;

        outcome.map_err(|error| match error {
            CircuitError::Open { key } => Error::service_unavailable()
                .with_message(format!("circuit breaker open for {key}")),
            CircuitError::Operation(error) => error,
        })
    }

    /// Stores a fresh result, records the miss and builds the response.
    async fn complete(
        &self,
        query: &str,
        model: ModelKey,
        result: DiagnosisResult,
        started_at: Timestamp,
    ) -> DiagnosisResponse {
        self.exact.set(query, result.clone(), model.id()).await;
        if let Some(semantic) = &self.semantic {
            semantic.set(query, result.clone(), model.id()).await;
        }

        let latency_ms = Timing::since(started_at).as_millis_f64();
        self.metrics.record_query(QueryKind::Miss, latency_ms, None).await;

        tracing::info!(target: TRACING_TARGET, model = %model, latency_ms, "diagnosis generated");
        DiagnosisResponse::success(result, uncached_metadata(Some(model), started_at))
    }

    /// Reports the language model and the semantic cache.
    ///
    /// Degraded when either dependency is unhealthy or any model circuit is
    /// not closed.
    pub async fn health(&self) -> ServiceHealth {
        let llm_healthy = self
            .llm
            .health_check()
            .await
            .is_ok_and(|health| health.is_healthy());
        let cache_healthy = match &self.semantic {
            Some(semantic) => semantic.health().await.is_healthy(),
            None => true,
        };

        let statuses = self.breaker.all_statuses().await;
        let open_circuits = statuses
            .values()
            .filter(|status| status.state != CircuitState::Closed)
            .count();

        let health = if llm_healthy && cache_healthy && open_circuits == 0 {
            ServiceHealth::healthy()
        } else {
            ServiceHealth::degraded("diagnosis dependencies degraded")
        };

        health
            .with_metric("language_model", llm_healthy)
            .with_metric("semantic_cache", cache_healthy)
            .with_metric("open_circuits", open_circuits)
    }
}

fn validate(query: &str, temperature: Option<f32>) -> Result<f32> {
    let chars = query.chars().count();
    if !QUERY_CHARS.contains(&chars) {
        return Err(Error::invalid_input().with_message(format!(
            "query must be {} to {} characters, got {chars}",
            QUERY_CHARS.start(),
            QUERY_CHARS.end()
        )));
    }

    let temperature = temperature.unwrap_or(DEFAULT_TEMPERATURE);
    if !(0.0..=1.0).contains(&temperature) {
        return Err(Error::invalid_input()
            .with_message(format!("temperature must be within [0, 1], got {temperature}")));
    }

    Ok(temperature)
}

fn uncached_metadata(model: Option<ModelKey>, started_at: Timestamp) -> ResponseMetadata {
    ResponseMetadata {
        from_cache: false,
        model: model.map(|model| model.id().to_owned()),
        similarity: None,
        latency_ms: Timing::since(started_at).as_millis_f64(),
        timestamp: Timestamp::now(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sentra_cache::SemanticCacheConfig;
    use sentra_core::ErrorKind;
    use sentra_core::emb::EmbeddingService;
    use sentra_test::{MockEmbeddingProvider, MockLanguageProvider};

    use super::*;
    use crate::circuit::CircuitBreakerConfig;

    const QUERY: &str = "Demam 4 hari, trombosit turun, bintik merah";

    fn pipeline(provider: MockLanguageProvider) -> DiagnosisPipeline {
        DiagnosisPipeline::new(LanguageModelService::new(provider), MetricsTracker::new())
    }

    #[tokio::test]
    async fn fresh_generation_records_miss_and_caches() -> anyhow::Result<()> {
        let provider = MockLanguageProvider::default();
        let pipeline = pipeline(provider.clone());

        let response = pipeline.generate(QUERY, GenerateOptions::default()).await?;

        assert!(response.success);
        assert!(!response.metadata.from_cache);
        assert_eq!(response.metadata.model.as_deref(), Some("deepseek/deepseek-chat"));
        let data = response.data.unwrap();
        assert_eq!(data.code, "A91");
        assert_eq!(data.proposed_referrals.len(), 1);

        let snapshot = pipeline.metrics().get_metrics().await;
        assert_eq!(snapshot.metrics.misses(), 1);
        assert!(pipeline.query_cache().get(QUERY).await.is_some());
        assert_eq!(provider.calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn repeated_query_is_an_exact_hit() -> anyhow::Result<()> {
        let provider = MockLanguageProvider::default();
        let pipeline = pipeline(provider.clone());

        pipeline.generate(QUERY, GenerateOptions::default()).await?;
        let response = pipeline
            .generate("demam 4 hari trombosit turun bintik merah", GenerateOptions::default())
            .await?;

        assert!(response.metadata.from_cache);
        assert_eq!(provider.calls(), 1);
        let metrics = pipeline.metrics().get_metrics().await.metrics;
        assert_eq!(metrics.exact_hits(), 1);
        assert_eq!(metrics.total_queries(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn semantic_hit_records_similarity() -> anyhow::Result<()> {
        let provider = MockLanguageProvider::default();
        let embeddings = EmbeddingService::new(MockEmbeddingProvider::default());
        let semantic = SemanticCache::new(embeddings, SemanticCacheConfig::default());
        let pipeline = pipeline(provider.clone()).with_semantic_cache(semantic);

        pipeline.generate(QUERY, GenerateOptions::default()).await?;
        pipeline.query_cache().invalidate(None).await;
        let response = pipeline.generate(QUERY, GenerateOptions::default()).await?;

        assert!(response.metadata.from_cache);
        assert!(response.metadata.similarity.is_some());
        assert_eq!(provider.calls(), 1);
        let metrics = pipeline.metrics().get_metrics().await.metrics;
        assert_eq!(metrics.semantic_hits(), 1);
        assert!(metrics.avg_similarity() > 0.99);
        Ok(())
    }

    #[tokio::test]
    async fn skip_cache_calls_the_model_again() -> anyhow::Result<()> {
        let provider = MockLanguageProvider::default();
        let pipeline = pipeline(provider.clone());

        pipeline.generate(QUERY, GenerateOptions::default()).await?;
        let response = pipeline
            .generate(QUERY, GenerateOptions::default().skip_cache())
            .await?;

        assert!(!response.metadata.from_cache);
        assert_eq!(provider.calls(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn failing_primary_falls_back() -> anyhow::Result<()> {
        let provider = MockLanguageProvider::default()
            .with_failure(ModelKey::DeepseekV3.id(), ErrorKind::ServiceUnavailable);
        let pipeline = pipeline(provider.clone());

        let response = pipeline.generate(QUERY, GenerateOptions::default()).await?;

        assert!(response.success);
        assert_eq!(response.metadata.model.as_deref(), Some(ModelKey::GlmCoding.id()));
        assert_eq!(
            provider.requested_models(),
            vec![ModelKey::DeepseekV3.id(), ModelKey::GlmCoding.id()]
        );
        let status = pipeline.circuit_breaker().status("DEEPSEEK_V3").await;
        assert_eq!(status.total_failures, 1);
        Ok(())
    }

    #[tokio::test]
    async fn requested_model_is_tried_first() -> anyhow::Result<()> {
        let provider = MockLanguageProvider::default();
        let pipeline = pipeline(provider.clone());

        let options = GenerateOptions::default().with_model(ModelKey::QwenTurbo);
        let response = pipeline.generate(QUERY, options).await?;

        assert_eq!(response.metadata.model.as_deref(), Some(ModelKey::QwenTurbo.id()));
        assert_eq!(provider.requested_models(), vec![ModelKey::QwenTurbo.id()]);
        Ok(())
    }

    #[tokio::test]
    async fn all_failures_are_classified() -> anyhow::Result<()> {
        let provider = MockLanguageProvider::default()
            .with_failure(ModelKey::DeepseekV3.id(), ErrorKind::ServiceUnavailable)
            .with_failure(ModelKey::GlmCoding.id(), ErrorKind::ServiceUnavailable)
            .with_failure(ModelKey::QwenTurbo.id(), ErrorKind::RateLimited);
        let pipeline = pipeline(provider);

        let response = pipeline.generate(QUERY, GenerateOptions::default()).await?;

        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("All AI models failed: RATE_LIMIT_EXCEEDED. Please try again.")
        );
        assert_eq!(pipeline.metrics().get_metrics().await.metrics.total_queries(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn unparseable_output_is_a_json_parse_error() -> anyhow::Result<()> {
        let pipeline = pipeline(MockLanguageProvider::with_response("no diagnosis today"));

        let response = pipeline.generate(QUERY, GenerateOptions::default()).await?;

        assert_eq!(
            response.error.as_deref(),
            Some("All AI models failed: JSON_PARSE_ERROR. Please try again.")
        );
        Ok(())
    }

    #[tokio::test]
    async fn open_circuits_short_circuit() -> anyhow::Result<()> {
        let config = CircuitBreakerConfig::default()
            .with_failure_threshold(1)
            .with_timeout(Duration::from_secs(3600));
        let provider = MockLanguageProvider::default()
            .with_failure(ModelKey::DeepseekV3.id(), ErrorKind::Authentication)
            .with_failure(ModelKey::GlmCoding.id(), ErrorKind::Authentication)
            .with_failure(ModelKey::QwenTurbo.id(), ErrorKind::Authentication);
        let pipeline = pipeline(provider.clone()).with_circuit_breaker(CircuitBreaker::new(config));

        let first = pipeline.generate(QUERY, GenerateOptions::default()).await?;
        assert_eq!(
            first.error.as_deref(),
            Some("All AI models failed: AUTHENTICATION_FAILED. Please try again.")
        );

        let second = pipeline.generate(QUERY, GenerateOptions::default()).await?;
        assert_eq!(second.error.as_deref(), Some(ALL_CIRCUITS_OPEN));
        assert_eq!(provider.calls(), 3);
        assert!(!pipeline.health().await.is_healthy());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_input_is_rejected() {
        let pipeline = pipeline(MockLanguageProvider::default());

        let short = pipeline.generate("  ab ", GenerateOptions::default()).await;
        assert_eq!(short.unwrap_err().kind(), ErrorKind::InvalidInput);

        let long = pipeline.generate(&"x".repeat(501), GenerateOptions::default()).await;
        assert!(long.is_err());

        let hot = pipeline
            .generate(QUERY, GenerateOptions::default().with_temperature(1.5))
            .await;
        assert_eq!(hot.unwrap_err().kind(), ErrorKind::InvalidInput);
    }
}
