use std::error::Error;
use thiserror::Error;

///
/// The error object, returned, if the circuit breaker has to do its job.
///
#[derive(Error, Debug)]
pub enum CircuitBreakerError<E: Error + 'static> {
    /// The breaker denied the call without running it. The same value is returned
    /// for every denial, whether the breaker is open or out of half-open probes.
    #[error("circuit breaker open")]
    Open,
    /// Returned, if the wrapped function failed. The error is passed through untouched.
    #[error(transparent)]
    Failed(E),
}

impl<E: Error + 'static> CircuitBreakerError<E> {
    /// True for the denial sentinel.
    pub fn is_open(&self) -> bool {
        matches!(self, CircuitBreakerError::Open)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CircuitBreakerError::Failed(_))
    }

    /// The error of the wrapped function, if it ran.
    pub fn inner(&self) -> Option<&E> {
        match self {
            CircuitBreakerError::Failed(err) => Some(err),
            CircuitBreakerError::Open => None,
        }
    }

    pub fn into_inner(self) -> Option<E> {
        match self {
            CircuitBreakerError::Failed(err) => Some(err),
            CircuitBreakerError::Open => None,
        }
    }
}

///
/// Rejected breaker configuration.
///
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("trip threshold must be at least 1")]
    ZeroTripThreshold,
    #[error("consecutive failure threshold must be at least 1")]
    ZeroConsecutiveFailures,
    #[error("failure rate must be within (0, 1], got {0}")]
    FailureRateOutOfRange(f64),
    #[error("half-open max successes must be at least 1")]
    ZeroHalfOpenMaxSuccesses,
}

/// A circuit state could not be parsed from its textual form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown circuit state '{0}'")]
pub struct ParseStateError(pub String);
