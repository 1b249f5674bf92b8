#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod emb;
pub mod llm;
pub mod prelude;
pub mod types;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use types::{ServiceHealth, ServiceStatus, Timing};
