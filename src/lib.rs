//! Circuit breaker guarding outbound remote calls.
//!
//! A [`ThresholdBreaker`] tracks the outcomes of the calls to one peer and fails
//! fast while the peer is considered down. The [`UnaryInterceptor`] runs every
//! call of an invoker through a breaker and reports denied calls to a handler.
use std::error::Error;

mod config;
mod counters;
mod error;
mod interceptor;
mod state;
mod threshold;
mod trip;

pub use config::BreakerConfig;
pub use counters::Counters;
pub use error::{CircuitBreakerError, ConfigError, ParseStateError};
pub use interceptor::{OpenStateHandler, UnaryInterceptor};
pub use state::{CircuitState, StateChangeListener};
pub use threshold::ThresholdBreaker;
pub use trip::TripPolicy;

///
/// This is the trait, which implements the guarded call of the wrapped function.
/// The breaker only looks at whether the function returned an error.
///
pub trait CircuitBreaker {
    fn call<F, R, E>(&self, f: F) -> Result<R, CircuitBreakerError<E>>
        where F: FnOnce() -> Result<R, E>,
              E: Error + 'static;

    /// The current state. Reading it never changes it.
    fn state(&self) -> CircuitState;
}
