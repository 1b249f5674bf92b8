//! Cached, fault-tolerant diagnosis generation.
//!
//! [`DiagnosisPipeline::generate`] answers from the exact cache, then the
//! semantic cache, and only then calls the language model, walking the
//! [`ModelKey`] fallback chain behind the circuit breaker.

mod model;
mod parse;
mod pipeline;
mod prompt;
mod response;

pub use model::{FALLBACK_CHAIN, ModelKey};
pub use parse::parse_diagnosis;
pub use pipeline::DiagnosisPipeline;
pub use prompt::{NON_REFERRAL_DIAGNOSES, SYSTEM_INSTRUCTION, build_prompt};
pub use response::{DiagnosisResponse, FailureClass, GenerateOptions, ResponseMetadata};

/// Tracing target for diagnosis operations.
pub const TRACING_TARGET: &str = "sentra_service::diagnosis";
