//! Mock language-model provider for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sentra_core::llm::{CompletionRequest, CompletionResponse, LanguageModelProvider};
use sentra_core::{Error, ErrorKind, Result, ServiceHealth};
use serde::{Deserialize, Serialize};

/// Diagnosis returned when no response override is configured.
const DEFAULT_RESPONSE: &str = r#"```json
{
  "code": "A91",
  "description": "Demam Berdarah Dengue",
  "category": "RUJUKAN_TAKTIK",
  "confidence_score": 0.86,
  "urgency": "URGENT",
  "triage_score": 7,
  "recommended_timeframe": "Dalam 24-72 jam",
  "evidence": {
    "clinical_reasoning": "Demam tinggi mendadak 3 hari disertai petekie",
    "guidelines": ["PPK Dokter di Faskes Primer 2017"],
    "red_flags": ["Perdarahan spontan", "Nyeri perut hebat"],
    "differential_diagnosis": ["A01.0 Demam Tifoid", "B54 Malaria"]
  },
  "clinical_notes": "Pantau trombosit dan hematokrit tiap 24 jam",
  "proposed_referrals": []
}
```"#;

/// Configuration for the mock language-model provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockLanguageConfig {
    /// Raw completion text returned for every successful request.
    pub response: Option<String>,

    /// Report the provider as unhealthy.
    pub unhealthy: bool,
}

/// Mock language-model provider for testing.
///
/// Returns the configured response for every model unless a failure was
/// scripted for that model id with [`MockLanguageProvider::with_failure`].
/// Every request is recorded and can be inspected with
/// [`MockLanguageProvider::requested_models`].
#[derive(Clone, Default, Debug)]
pub struct MockLanguageProvider {
    config: MockLanguageConfig,
    failures: HashMap<String, ErrorKind>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockLanguageProvider {
    /// Creates a new mock provider with the given configuration.
    pub fn new(config: MockLanguageConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Creates a provider that always answers with `content`.
    pub fn with_response(content: impl Into<String>) -> Self {
        Self::new(MockLanguageConfig {
            response: Some(content.into()),
            ..Default::default()
        })
    }

    /// Makes every request for `model` fail with `kind`.
    pub fn with_failure(mut self, model: impl Into<String>, kind: ErrorKind) -> Self {
        self.failures.insert(model.into(), kind);
        self
    }

    /// Model ids of every request received so far, in order.
    pub fn requested_models(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of requests received so far.
    pub fn calls(&self) -> usize {
        self.requested_models().len()
    }
}

#[async_trait::async_trait]
impl LanguageModelProvider for MockLanguageProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.model.clone());
        }

        if let Some(kind) = self.failures.get(&request.model) {
            return Err(Error::new(*kind).with_message(format!("mock failure for {}", request.model)));
        }

        let content = self.config.response.as_deref().unwrap_or(DEFAULT_RESPONSE);
        Ok(CompletionResponse::new(request.model.clone(), content))
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        if self.config.unhealthy {
            return Ok(ServiceHealth::unhealthy("mock language model is down"));
        }

        Ok(ServiceHealth::healthy())
    }
}
