use std::fmt;
use std::str::FromStr;

use crate::error::ParseStateError;

///
/// The three states of the CircuitBreaker.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitState {
    Closed, Open, HalfOpen
}

impl CircuitState {
    /// The textual form used in logs: `closed`, `open` or `half-open`.
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CircuitState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "closed" => Ok(CircuitState::Closed),
            "open" => Ok(CircuitState::Open),
            "half-open" => Ok(CircuitState::HalfOpen),
            other => Err(ParseStateError(String::from(other))),
        }
    }
}

///
/// Observer for state transitions of a breaker.
/// It is called once per transition, after the breaker released its lock.
///
pub trait StateChangeListener: Send + Sync {
    fn on_state_change(&self, name: &str, from: CircuitState, to: CircuitState);
}

impl<F> StateChangeListener for F
    where F: Fn(&str, CircuitState, CircuitState) + Send + Sync
{
    fn on_state_change(&self, name: &str, from: CircuitState, to: CircuitState) {
        self(name, from, to)
    }
}
