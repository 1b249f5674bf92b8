//! Shared circuit breaker handle.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use tokio::sync::RwLock;

use super::{CircuitBreakerConfig, CircuitState, CircuitStatus, TRACING_TARGET};

/// Failure of a call guarded by [`CircuitBreaker::execute`].
#[derive(Debug, thiserror::Error)]
pub enum CircuitError<E> {
    /// The circuit rejected the call without running it.
    #[error("circuit breaker open for {key}")]
    Open { key: String },
    /// The call ran and failed.
    #[error(transparent)]
    Operation(E),
}

/// Cloneable handle over the circuits of every key.
#[derive(Clone, Default)]
pub struct CircuitBreaker {
    circuits: Arc<RwLock<HashMap<String, CircuitStatus>>>,
    config: CircuitBreakerConfig,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker {
    /// Creates a breaker with no circuits.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            circuits: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Returns the breaker configuration.
    pub fn config(&self) -> CircuitBreakerConfig {
        self.config
    }

    /// Whether a request for `key` may run now.
    ///
    /// An open circuit whose timeout has elapsed moves to half-open here.
    pub async fn can_execute(&self, key: &str) -> bool {
        let mut circuits = self.circuits.write().await;
        let circuit = circuits.entry(key.to_owned()).or_default();

        match circuit.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if !self.timeout_elapsed(circuit.last_failure_time) {
                    return false;
                }

                circuit.transition(CircuitState::HalfOpen);
                tracing::info!(target: TRACING_TARGET, key, "circuit half-open");
                true
            }
            CircuitState::HalfOpen => circuit.success_count < self.config.success_threshold,
        }
    }

    fn timeout_elapsed(&self, last_failure: Option<Timestamp>) -> bool {
        let Some(last_failure) = last_failure else {
            return false;
        };
        let Ok(timeout) = SignedDuration::try_from(self.config.timeout) else {
            return false;
        };

        Timestamp::now().duration_since(last_failure) >= timeout
    }

    /// Records a successful request.
    pub async fn record_success(&self, key: &str) {
        let mut circuits = self.circuits.write().await;
        let circuit = circuits.entry(key.to_owned()).or_default();

        circuit.success_count += 1;
        circuit.total_requests += 1;
        circuit.failure_count = 0;
        circuit.last_success_time = Some(Timestamp::now());

        if circuit.state == CircuitState::HalfOpen
            && circuit.success_count >= self.config.success_threshold
        {
            tracing::info!(
                target: TRACING_TARGET,
                key,
                successes = circuit.success_count,
                "circuit closed"
            );
            circuit.transition(CircuitState::Closed);
        }
    }

    /// Records a failed request.
    pub async fn record_failure(&self, key: &str) {
        let mut circuits = self.circuits.write().await;
        let circuit = circuits.entry(key.to_owned()).or_default();

        circuit.failure_count += 1;
        circuit.total_failures += 1;
        circuit.total_requests += 1;
        circuit.success_count = 0;
        circuit.last_failure_time = Some(Timestamp::now());

        tracing::debug!(
            target: TRACING_TARGET,
            key,
            failures = circuit.failure_count,
            threshold = self.config.failure_threshold,
            "failure recorded"
        );

        if circuit.state != CircuitState::Open
            && circuit.failure_count >= self.config.failure_threshold
        {
            tracing::warn!(target: TRACING_TARGET, key, "circuit opened");
            circuit.transition(CircuitState::Open);
        }
    }

    /// Status of `key`; an unknown key reports a fresh closed circuit.
    pub async fn status(&self, key: &str) -> CircuitStatus {
        self.circuits
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Status of every key seen so far, ordered by key.
    pub async fn all_statuses(&self) -> BTreeMap<String, CircuitStatus> {
        self.circuits
            .read()
            .await
            .iter()
            .map(|(key, status)| (key.clone(), status.clone()))
            .collect()
    }

    /// Returns `key` to a fresh closed circuit.
    pub async fn reset(&self, key: &str) {
        self.circuits
            .write()
            .await
            .insert(key.to_owned(), CircuitStatus::default());
        tracing::info!(target: TRACING_TARGET, key, "circuit reset");
    }

    /// Forgets every circuit.
    pub async fn reset_all(&self) {
        self.circuits.write().await.clear();
        tracing::info!(target: TRACING_TARGET, "all circuits reset");
    }

    /// Runs `operation` if the circuit for `key` allows it and records the
    /// outcome.
    pub async fn execute<F, Fut, T, E>(&self, key: &str, operation: F) -> Result<T, CircuitError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        if !self.can_execute(key).await {
            return Err(CircuitError::Open {
                key: key.to_owned(),
            });
        }

        match operation().await {
            Ok(value) => {
                self.record_success(key).await;
                Ok(value)
            }
            Err(error) => {
                tracing::warn!(target: TRACING_TARGET, key, error = %error, "guarded call failed");
                self.record_failure(key).await;
                Err(CircuitError::Operation(error))
            }
        }
    }
}
