use crate::counters::Counters;
use crate::error::ConfigError;

///
/// Decides, after a failure was recorded while closed, whether the breaker trips.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TripPolicy {
    /// Trips when the failures since the last counter reset reach the threshold.
    Threshold(u64),
    /// Trips when this many failures happened in a row.
    ConsecutiveFailures(u64),
    /// Trips when at least `min_samples` outcomes were recorded and the
    /// share of failures among them reaches `rate`.
    FailureRate { min_samples: u64, rate: f64 },
}

impl TripPolicy {
    pub fn should_trip(&self, counters: &Counters) -> bool {
        match *self {
            TripPolicy::Threshold(threshold) => counters.failures >= threshold,
            TripPolicy::ConsecutiveFailures(threshold) => counters.consecutive_failures >= threshold,
            TripPolicy::FailureRate { min_samples, rate } => {
                let total = counters.total();
                total > 0
                    && total >= min_samples
                    && counters.failures as f64 / total as f64 >= rate
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            TripPolicy::Threshold(0) => Err(ConfigError::ZeroTripThreshold),
            TripPolicy::ConsecutiveFailures(0) => Err(ConfigError::ZeroConsecutiveFailures),
            TripPolicy::FailureRate { rate, .. } if !(rate > 0.0 && rate <= 1.0) => {
                Err(ConfigError::FailureRateOutOfRange(rate))
            }
            _ => Ok(()),
        }
    }
}

impl Default for TripPolicy {
    fn default() -> Self {
        TripPolicy::Threshold(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(outcomes: &[bool]) -> Counters {
        let mut c = Counters::default();
        for ok in outcomes {
            if *ok { c.record_success() } else { c.record_failure() }
        }
        c
    }

    #[test]
    fn threshold_counts_all_failures() {
        let policy = TripPolicy::Threshold(3);
        assert!(!policy.should_trip(&counters(&[false, true, false])));
        assert!(policy.should_trip(&counters(&[false, true, false, true, false])));
    }

    #[test]
    fn consecutive_failures_need_a_streak() {
        let policy = TripPolicy::ConsecutiveFailures(2);
        assert!(!policy.should_trip(&counters(&[false, true, false])));
        assert!(policy.should_trip(&counters(&[true, false, false])));
    }

    #[test]
    fn failure_rate_waits_for_samples() {
        let policy = TripPolicy::FailureRate { min_samples: 4, rate: 0.5 };
        assert!(!policy.should_trip(&counters(&[false, false, false])));
        assert!(policy.should_trip(&counters(&[false, false, true, true])));
        assert!(!policy.should_trip(&counters(&[false, true, true, true])));
    }

    #[test]
    fn invalid_policies() {
        assert_eq!(Err(ConfigError::ZeroTripThreshold), TripPolicy::Threshold(0).validate());
        assert_eq!(Err(ConfigError::ZeroConsecutiveFailures), TripPolicy::ConsecutiveFailures(0).validate());
        assert_eq!(
            Err(ConfigError::FailureRateOutOfRange(1.5)),
            TripPolicy::FailureRate { min_samples: 1, rate: 1.5 }.validate());
        assert!(TripPolicy::FailureRate { min_samples: 0, rate: 1.0 }.validate().is_ok());
    }
}
