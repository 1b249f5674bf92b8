use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// State of one circuit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Requests flow normally.
    #[default]
    Closed,
    /// Requests are rejected until the timeout elapses.
    Open,
    /// Probe requests are let through.
    HalfOpen,
}

/// Counters and state of one circuit.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitStatus {
    pub state: CircuitState,
    /// Consecutive failures.
    pub failure_count: u32,
    /// Consecutive successes.
    pub success_count: u32,
    pub last_failure_time: Option<Timestamp>,
    pub last_success_time: Option<Timestamp>,
    pub total_requests: u64,
    pub total_failures: u64,
}

impl CircuitStatus {
    pub(crate) fn transition(&mut self, state: CircuitState) {
        self.state = state;
        match state {
            CircuitState::Open => self.success_count = 0,
            CircuitState::HalfOpen | CircuitState::Closed => {
                self.failure_count = 0;
                self.success_count = 0;
            }
        }
    }
}
