//! Pipeline options and response envelope.

use jiff::Timestamp;
use sentra_core::types::DiagnosisResult;
use sentra_core::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};

use super::ModelKey;

/// Options for one diagnosis request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOptions {
    /// Model to try before the fallback chain.
    #[serde(default)]
    pub model: Option<ModelKey>,
    /// Bypass both caches on lookup. Results are still stored.
    #[serde(default)]
    pub skip_cache: bool,
    /// Sampling temperature in `[0, 1]`; 0.05 when absent.
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl GenerateOptions {
    /// Requests a specific model first.
    pub fn with_model(mut self, model: ModelKey) -> Self {
        self.model = Some(model);
        self
    }

    /// Bypasses cache lookups.
    pub fn skip_cache(mut self) -> Self {
        self.skip_cache = true;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Timing and provenance of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub from_cache: bool,
    /// Provider id of the model that produced the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Similarity of a semantic cache hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    pub latency_ms: f64,
    pub timestamp: Timestamp,
}

/// Outcome of [`DiagnosisPipeline::generate`].
///
/// [`DiagnosisPipeline::generate`]: super::DiagnosisPipeline::generate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DiagnosisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metadata: ResponseMetadata,
}

impl DiagnosisResponse {
    pub(crate) fn success(data: DiagnosisResult, metadata: ResponseMetadata) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata,
        }
    }

    pub(crate) fn failure(error: impl Into<String>, metadata: ResponseMetadata) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            metadata,
        }
    }
}

/// Classification of the last model failure, reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, IntoStaticStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureClass {
    AuthenticationFailed,
    RateLimitExceeded,
    ServiceUnavailable,
    ConnectionRefused,
    JsonParseError,
    UnknownError,
}

impl FailureClass {
    /// Maps an error onto its class.
    pub fn classify(error: &Error) -> Self {
        match error.kind() {
            ErrorKind::Authentication => Self::AuthenticationFailed,
            ErrorKind::RateLimited => Self::RateLimitExceeded,
            ErrorKind::ServiceUnavailable => Self::ServiceUnavailable,
            ErrorKind::ConnectionRefused => Self::ConnectionRefused,
            ErrorKind::Serialization => Self::JsonParseError,
            _ => Self::UnknownError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_error_kinds() {
        assert_eq!(
            FailureClass::classify(&Error::rate_limited()).to_string(),
            "RATE_LIMIT_EXCEEDED"
        );
        assert_eq!(
            FailureClass::classify(&Error::serialization()),
            FailureClass::JsonParseError
        );
        assert_eq!(
            FailureClass::classify(&Error::authentication()),
            FailureClass::AuthenticationFailed
        );
        assert_eq!(
            FailureClass::classify(&Error::connection_refused().with_message("dial tcp")),
            FailureClass::ConnectionRefused
        );
        assert_eq!(
            FailureClass::classify(&Error::timeout()),
            FailureClass::UnknownError
        );
    }

    #[test]
    fn options_deserialize_camel_case() {
        let options: GenerateOptions =
            serde_json::from_str(r#"{"model": "QWEN_TURBO", "skipCache": true}"#).unwrap();

        assert_eq!(options.model, Some(ModelKey::QwenTurbo));
        assert!(options.skip_cache);
        assert_eq!(options.temperature, None);
    }
}
