use std::time::Duration;

use crate::error::ConfigError;
use crate::trip::TripPolicy;

///
/// Construction time configuration of a ThresholdBreaker.
///
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerConfig {
    /// When a closed breaker trips.
    pub trip: TripPolicy,
    /// How long the breaker stays open before a probe call is let through.
    pub open_timeout: Duration,
    /// Consecutive probe successes needed to close a half-open breaker.
    /// Also the number of probes allowed in flight at once.
    pub half_open_max_successes: u64,
    /// While closed, the counters are zeroed once this period elapsed.
    /// Zero disables the periodic reset.
    pub counter_reset_interval: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        BreakerConfig {
            trip: TripPolicy::default(),
            open_timeout: Duration::from_secs(10),
            half_open_max_successes: 5,
            counter_reset_interval: Duration::from_secs(60),
        }
    }
}

impl BreakerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip after `threshold` failures since the last counter reset.
    pub fn with_trip_threshold(self, threshold: u64) -> Self {
        self.with_trip_policy(TripPolicy::Threshold(threshold))
    }

    pub fn with_trip_policy(mut self, trip: TripPolicy) -> Self {
        self.trip = trip;
        self
    }

    pub fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = timeout;
        self
    }

    pub fn with_half_open_max_successes(mut self, successes: u64) -> Self {
        self.half_open_max_successes = successes;
        self
    }

    pub fn with_counter_reset_interval(mut self, interval: Duration) -> Self {
        self.counter_reset_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trip.validate()?;
        if self.half_open_max_successes == 0 {
            return Err(ConfigError::ZeroHalfOpenMaxSuccesses);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(BreakerConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let config = BreakerConfig::new()
            .with_trip_threshold(3)
            .with_open_timeout(Duration::from_millis(2500))
            .with_half_open_max_successes(3)
            .with_counter_reset_interval(Duration::from_secs(60));
        assert_eq!(TripPolicy::Threshold(3), config.trip);
        assert_eq!(Duration::from_millis(2500), config.open_timeout);
        assert_eq!(3, config.half_open_max_successes);
        assert_eq!(Duration::from_secs(60), config.counter_reset_interval);
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(
            Err(ConfigError::ZeroHalfOpenMaxSuccesses),
            BreakerConfig::new().with_half_open_max_successes(0).validate());
        assert_eq!(
            Err(ConfigError::ZeroTripThreshold),
            BreakerConfig::new().with_trip_threshold(0).validate());
    }
}
