//! Per-model circuit breaker.
//!
//! Each key (a model) moves through `Closed -> Open -> HalfOpen -> Closed`:
//! enough consecutive failures open the circuit, a cool-down lets probe
//! requests through, and enough consecutive probe successes close it again.

mod breaker;
mod config;
mod state;

pub use breaker::{CircuitBreaker, CircuitError};
pub use config::CircuitBreakerConfig;
pub use state::{CircuitState, CircuitStatus};

/// Tracing target for circuit breaker operations.
pub const TRACING_TARGET: &str = "sentra_service::circuit";
