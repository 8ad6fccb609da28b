//! Retry policy for status page requests.

use std::time::Duration;

/// Configuration for linearly growing retry backoff.
///
/// A fetch makes one initial attempt plus up to `max_retries` retries.
/// Before retry `n` (0-indexed) the fetcher waits `(n + 1) * backoff_unit`,
/// so with the defaults the waits are 2s, 4s and 6s.
///
/// # Defaults
///
/// - `max_retries`: 3
/// - `backoff_unit`: 2000 ms
///
/// # Example
///
/// ```
/// use ohs_monitor::controller::{RetryPolicy, RetryStep};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .with_max_retries(2)
///     .with_backoff_unit(Duration::from_millis(500));
///
/// assert_eq!(
///     policy.next_step(1),
///     RetryStep::BackOff(Duration::from_millis(1000))
/// );
/// assert_eq!(policy.next_step(2), RetryStep::Exhausted);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    ///
    /// A value of 0 means only the initial attempt is made.
    pub max_retries: u32,

    /// Base unit multiplied by the attempt number to get each backoff.
    pub backoff_unit: Duration,
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// Wait for the given duration, then try again.
    BackOff(Duration),
    /// The retry budget is spent; give up.
    Exhausted,
}

impl RetryPolicy {
    /// Default maximum retries.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Default backoff unit (2 seconds).
    pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_millis(2000);

    /// Creates a new retry policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: Self::DEFAULT_MAX_RETRIES,
            backoff_unit: Self::DEFAULT_BACKOFF_UNIT,
        }
    }

    /// Sets the maximum number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the backoff unit.
    ///
    /// Zero is supported (useful in tests) but creates a tight retry loop.
    #[must_use]
    pub const fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Total number of attempts this policy allows.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Computes the backoff before the retry following `attempt_index`.
    ///
    /// `attempt_index` is 0 for the initial attempt, 1 for the first retry, etc.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt_index: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(attempt_index.saturating_add(1))
    }

    /// Decides what follows a failure of the attempt at `attempt_index`.
    #[must_use]
    pub fn next_step(&self, attempt_index: u32) -> RetryStep {
        if attempt_index < self.max_retries {
            RetryStep::BackOff(self.delay_for_attempt(attempt_index))
        } else {
            RetryStep::Exhausted
        }
    }

    /// Sum of every backoff wait if all attempts fail.
    #[must_use]
    pub fn worst_case_backoff(&self) -> Duration {
        (0..self.max_retries)
            .map(|i| self.delay_for_attempt(i))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}
