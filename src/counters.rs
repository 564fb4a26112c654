///
/// Outcome counters of a breaker since their last reset.
/// All of them are zeroed on every state transition and, while closed,
/// whenever the counter reset interval elapsed.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub successes: u64,
    pub failures: u64,
    pub consecutive_successes: u64,
    pub consecutive_failures: u64,
}

impl Counters {
    pub(crate) fn record_success(&mut self) {
        self.successes = self.successes.saturating_add(1);
        self.consecutive_successes = self.consecutive_successes.saturating_add(1);
        self.consecutive_failures = 0;
    }

    pub(crate) fn record_failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_successes = 0;
    }

    pub(crate) fn reset(&mut self) {
        *self = Counters::default();
    }

    /// Number of outcomes recorded.
    pub fn total(&self) -> u64 {
        self.successes.saturating_add(self.failures)
    }
}
