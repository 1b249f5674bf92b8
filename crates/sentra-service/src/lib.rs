#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod circuit;
pub mod diagnosis;

pub use circuit::{CircuitBreaker, CircuitBreakerConfig, CircuitError, CircuitState, CircuitStatus};
pub use diagnosis::{
    DiagnosisPipeline, DiagnosisResponse, FailureClass, GenerateOptions, ModelKey,
    ResponseMetadata,
};
