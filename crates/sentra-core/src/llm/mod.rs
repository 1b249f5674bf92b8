//! Language-model provider abstractions.
//!
//! The diagnosis pipeline talks to a hosted chat-completion API through
//! [`LanguageModelProvider`]. Transport, authentication and retry headers are
//! the provider's concern; the pipeline only sees [`CompletionRequest`] in
//! and [`CompletionResponse`] out.

mod request;
mod service;

use async_trait::async_trait;
pub use request::{ChatMessage, ChatRole, CompletionRequest, CompletionResponse};
pub use service::LanguageModelService;

use crate::{Result, ServiceHealth};

/// Tracing target for language-model operations.
pub const TRACING_TARGET: &str = "sentra_core::llm";

/// Core trait for chat-completion providers.
///
/// Implementations map transport failures onto [`ErrorKind`] so the
/// pipeline can classify them (authentication, rate limit, unavailable,
/// connection refused).
///
/// [`ErrorKind`]: crate::ErrorKind
#[async_trait]
pub trait LanguageModelProvider: Send + Sync {
    /// Sends a completion request and returns the raw model text.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;

    /// Performs a health check on the provider.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
