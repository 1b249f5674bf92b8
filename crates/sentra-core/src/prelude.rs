//! Convenient re-exports for common use.

pub use crate::emb::{EmbeddingProvider, EmbeddingService};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::llm::{LanguageModelProvider, LanguageModelService};
pub use crate::types::{DiagnosisResult, ServiceHealth, ServiceStatus, Timing};
