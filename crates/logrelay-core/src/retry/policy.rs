use std::time::Duration;

/// Exponential backoff policy: `sleep = base_delay * 2^attempt_index`, where
/// `attempt_index` starts at 0 for the first failed attempt.
///
/// Knows nothing about HTTP or transports; it only answers "how many
/// attempts are allowed" and "how long to wait before the next one".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed for one dispatch, including the first:
    /// `retries + 1`.
    pub max_attempts: u32,
    /// First backoff interval.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// Default `retries = 2`, `base_delay = 0.5s`.
    fn default() -> Self {
        Self::from_retries(2, Duration::from_millis(500))
    }
}

impl RetryPolicy {
    /// Builds a policy from the `retries` and `base_delay` configuration
    /// inputs.
    pub fn from_retries(retries: u32, base_delay: Duration) -> Self {
        Self { max_attempts: retries.saturating_add(1), base_delay }
    }

    /// True iff another attempt is allowed after `attempt_index` (0-based)
    /// has just failed.
    pub fn has_attempts_remaining(&self, attempt_index: u32) -> bool {
        attempt_index.saturating_add(1) < self.max_attempts
    }

    /// The backoff delay to wait before retrying after `attempt_index`
    /// (0-based) has failed: `base_delay * 2^attempt_index`.
    pub fn backoff_delay(&self, attempt_index: u32) -> Duration {
        // Cap the shift at 31: 1 << 32 overflows u32 on the cast below.
        let factor = 1u32 << attempt_index.min(31);
        self.base_delay.saturating_mul(factor)
    }
}
