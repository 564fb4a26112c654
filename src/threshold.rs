use std::error::Error;
use std::time::Instant;
use log::{debug, warn, trace};
use parking_lot::{Mutex, MutexGuard};

use crate::config::BreakerConfig;
use crate::counters::Counters;
use crate::error::ConfigError;
use crate::state::{CircuitState, StateChangeListener};
use crate::CircuitBreaker;
use crate::CircuitBreakerError;

///
/// The CircuitBreaker is implementing the protection pattern for distributed services.
/// One instance guards the calls to one remote peer and is shared by all callers
/// talking to it. The state is kept behind a single lock, the guarded calls
/// themselves run outside of it.
///
pub struct ThresholdBreaker {
    /// The name of this breaker to better identify it in the logs.
    name: String,
    config: BreakerConfig,
    inner: Mutex<Inner>,
    listeners: Vec<Box<dyn StateChangeListener>>,
}

/// Everything mutable about a breaker. Only touched under the lock.
struct Inner {
    /// The current state of the circuit breaker
    status: CircuitState,
    counters: Counters,
    counters_reset_at: Instant,
    /// The point in time, when the circuit was opened.
    time_of_tripping: Option<Instant>,
    probes_in_flight: u64,
    /// Bumped on every transition. Outcomes of calls admitted under an older
    /// generation are dropped.
    generation: u64,
}

/// Handed out when a call is let through, needed to record its outcome.
#[derive(Debug, Clone, Copy)]
struct Admission {
    generation: u64,
    probe: bool,
}

type Transition = (CircuitState, CircuitState);

impl Inner {
    fn transition(&mut self, to: CircuitState, now: Instant) -> Transition {
        let from = self.status;
        self.status = to;
        self.generation = self.generation.wrapping_add(1);
        self.counters.reset();
        self.counters_reset_at = now;
        self.probes_in_flight = 0;
        self.time_of_tripping = match to {
            CircuitState::Open => Some(now),
            _ => None,
        };
        (from, to)
    }
}

impl CircuitBreaker for ThresholdBreaker {
    /// Try to execute and count the failures here.
    /// Any error returned by the embedded function will be propagated to the callee.
    /// CircuitBreakerError::Open is returned, without calling the function, if the
    /// breaker denies the call.
    fn call<F, R, E>(&self, f: F) -> Result<R, CircuitBreakerError<E>>
        where F: FnOnce() -> Result<R, E>,
              E: Error + 'static
    {
        trace!("[ThresholdBreaker::call({})]", self.name);
        let admission = match self.admit(Instant::now()) {
            Some(admission) => admission,
            None => return Err(CircuitBreakerError::Open),
        };
        let mut pending = Pending { breaker: self, admission: Some(admission) };
        let result = f();
        pending.finish(result.is_ok());
        result.map_err(CircuitBreakerError::Failed)
    }

    fn state(&self) -> CircuitState {
        self.lock().status
    }
}

impl ThresholdBreaker
{
    /// Creates a new CircuitBreaker instance in the closed state.
    /// @param name The name of the circuit breaker, for logging/debugging purposes.
    /// @param config Trip policy, timeouts and counter reset interval.
    pub fn new(name: &str, config: BreakerConfig) -> Result<ThresholdBreaker, ConfigError>
    {
        debug!("[ThresholdBreaker::new({})] {:?}", name, config);
        config.validate()?;

        Ok(ThresholdBreaker {
            name: String::from(name),
            config,
            inner: Mutex::new(Inner {
                status: CircuitState::Closed,
                counters: Counters::default(),
                counters_reset_at: Instant::now(),
                time_of_tripping: None,
                probes_in_flight: 0,
                generation: 0,
            }),
            listeners: Vec::new(),
        })
    }

    /// Registers a listener for state transitions. Listeners run in the order they were added.
    pub fn with_listener<L>(mut self, listener: L) -> Self
        where L: StateChangeListener + 'static
    {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Snapshot of the outcome counters.
    pub fn counters(&self) -> Counters {
        self.lock().counters
    }

    /// Tells whether a call issued now would be let through. Doesn't change the state.
    pub fn ready(&self) -> bool {
        let now = Instant::now();
        let inner = self.lock();
        match inner.status {
            CircuitState::Closed => true,
            CircuitState::Open => self.open_timeout_elapsed(&inner, now),
            CircuitState::HalfOpen => inner.probes_in_flight < self.config.half_open_max_successes,
        }
    }

    /// Forces the breaker into the closed state with zeroed counters.
    pub fn reset(&self) {
        debug!("[ThresholdBreaker::reset({})]", self.name);
        let (from, to) = self.lock().transition(CircuitState::Closed, Instant::now());
        if from != to {
            self.notify(from, to);
        }
    }

    /// Forces the breaker into the open state. The open timeout starts now.
    pub fn force_open(&self) {
        warn!("[ThresholdBreaker::force_open({})]", self.name);
        let (from, to) = self.lock().transition(CircuitState::Open, Instant::now());
        if from != to {
            self.notify(from, to);
        }
    }

    /// Decides whether a call may run. Performs the transition to half open, if
    /// the open timeout elapsed, and the lazy counter reset while closed.
    fn admit(&self, now: Instant) -> Option<Admission> {
        let mut transition = None;
        let admission = {
            let mut inner = self.lock();
            let status = inner.status;
            match status {
                CircuitState::Closed => {
                    self.reset_stale_counters(&mut inner, now);
                    Some(Admission { generation: inner.generation, probe: false })
                }
                CircuitState::Open => {
                    if self.open_timeout_elapsed(&inner, now) {
                        debug!("[ThresholdBreaker::admit({})] open timeout elapsed, probing.", self.name);
                        transition = Some(inner.transition(CircuitState::HalfOpen, now));
                        inner.probes_in_flight = 1;
                        Some(Admission { generation: inner.generation, probe: true })
                    } else {
                        debug!("[ThresholdBreaker::admit({})] stays open!", self.name);
                        None
                    }
                }
                CircuitState::HalfOpen => {
                    if inner.probes_in_flight < self.config.half_open_max_successes {
                        inner.probes_in_flight += 1;
                        Some(Admission { generation: inner.generation, probe: true })
                    } else {
                        debug!("[ThresholdBreaker::admit({})] no probes left!", self.name);
                        None
                    }
                }
            }
        };
        if let Some((from, to)) = transition {
            self.notify(from, to);
        }
        admission
    }

    /// Records the outcome of an admitted call and performs the transition it causes.
    fn record(&self, admission: Admission, success: bool, now: Instant) {
        let transition = {
            let mut inner = self.lock();
            if inner.generation != admission.generation {
                trace!("[ThresholdBreaker::record({})] Outcome of an earlier state ignored.", self.name);
                return;
            }
            if admission.probe {
                inner.probes_in_flight = inner.probes_in_flight.saturating_sub(1);
            }
            let status = inner.status;
            match (status, success) {
                (CircuitState::Closed, true) => {
                    inner.counters.record_success();
                    None
                }
                (CircuitState::Closed, false) => {
                    inner.counters.record_failure();
                    trace!("[ThresholdBreaker::record({})] Function call failed {} times.",
                        self.name, inner.counters.failures);
                    if self.config.trip.should_trip(&inner.counters) {
                        warn!("[ThresholdBreaker::record({})] tripped after {} failures.",
                            self.name, inner.counters.failures);
                        Some(inner.transition(CircuitState::Open, now))
                    } else {
                        None
                    }
                }
                (CircuitState::HalfOpen, true) => {
                    inner.counters.record_success();
                    if inner.counters.consecutive_successes >= self.config.half_open_max_successes {
                        debug!("[ThresholdBreaker::record({})] recovered.", self.name);
                        Some(inner.transition(CircuitState::Closed, now))
                    } else {
                        None
                    }
                }
                (CircuitState::HalfOpen, false) => {
                    warn!("[ThresholdBreaker::record({})] probe failed, open again!", self.name);
                    Some(inner.transition(CircuitState::Open, now))
                }
                (CircuitState::Open, _) => {
                    trace!("[ThresholdBreaker::record({})] Outcome while open ignored.", self.name);
                    None
                }
            }
        };
        if let Some((from, to)) = transition {
            self.notify(from, to);
        }
    }

    fn open_timeout_elapsed(&self, inner: &Inner, now: Instant) -> bool {
        match inner.time_of_tripping {
            Some(tripped) => now.saturating_duration_since(tripped) >= self.config.open_timeout,
            None => true,
        }
    }

    fn reset_stale_counters(&self, inner: &mut Inner, now: Instant) {
        let interval = self.config.counter_reset_interval;
        if interval.as_nanos() == 0 {
            return;
        }
        if now.saturating_duration_since(inner.counters_reset_at) >= interval {
            trace!("[ThresholdBreaker::reset_stale_counters({})]", self.name);
            inner.counters.reset();
            inner.counters_reset_at = now;
        }
    }

    fn notify(&self, from: CircuitState, to: CircuitState) {
        debug!("[ThresholdBreaker::notify({})] {} -> {}", self.name, from, to);
        for listener in &self.listeners {
            listener.on_state_change(&self.name, from, to);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock()
    }
}

/// Records an admitted call as failed, if the function unwinds before its
/// outcome is known.
struct Pending<'a> {
    breaker: &'a ThresholdBreaker,
    admission: Option<Admission>,
}

impl Pending<'_> {
    fn finish(&mut self, success: bool) {
        if let Some(admission) = self.admission.take() {
            self.breaker.record(admission, success, Instant::now());
        }
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.finish(false);
    }
}
