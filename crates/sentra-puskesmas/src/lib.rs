#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod matcher;
mod record;

pub use error::{DatasetError, Result};
pub use matcher::DiseaseMatcher;
pub use record::{DiseaseRecord, TreatmentProtocol, extract_danger_signs, extract_treatment_actions};

/// Tracing target for disease table operations.
pub const TRACING_TARGET: &str = "sentra_puskesmas";
