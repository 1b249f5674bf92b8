//! Mock implementations of AI services for testing.
//!
//! This module provides mock implementations of the embedding and
//! language-model providers defined in sentra-core. These mocks are
//! deterministic and never touch the network.

mod embedding;
mod language;

pub use embedding::{MockEmbeddingConfig, MockEmbeddingProvider};
pub use language::{MockLanguageConfig, MockLanguageProvider};
