//! Retry policy for transient failures.
//!
//! A [`RetryPolicy`] decides which failures are worth another attempt and how
//! long to wait before it. Server errors and transport failures are always
//! retried; the set of additional retryable status codes defaults to 429 only.

use crate::Error;
use rand::Rng;
use std::collections::BTreeSet;
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: usize = 8;

/// Default base backoff before the first retry.
pub const DEFAULT_BASE_BACKOFF: Duration = Duration::from_millis(500);

/// Default upper bound for a single backoff sleep.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Jitter factors are drawn uniformly from this range.
const JITTER_RANGE: std::ops::Range<f64> = 1.0..1.5;

/// Defines when and how failed requests are retried.
///
/// The delay before retry `n` (0-indexed) is `base_backoff * 2^n`, multiplied by a
/// random jitter factor in `[1.0, 1.5)` and capped at `max_backoff`. Because the
/// jitter range is narrower than the doubling, successive delays never decrease.
///
/// # Examples
///
/// ```
/// use apify_client::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(100)).without_jitter();
///
/// assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
/// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
/// assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: usize,
    /// Delay before the first retry, doubled for each following one.
    pub base_backoff: Duration,
    /// Upper bound for a single delay.
    pub max_backoff: Duration,
    /// Status codes retried in addition to every 5xx.
    pub retry_on_status: BTreeSet<u16>,
    /// Whether to randomize delays (recommended when many clients share a rate limit).
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BASE_BACKOFF)
    }
}

impl RetryPolicy {
    /// Creates a policy with the given budget and base backoff, retrying 429 and 5xx.
    pub fn new(max_retries: usize, base_backoff: Duration) -> Self {
        Self {
            max_retries,
            base_backoff,
            max_backoff: DEFAULT_MAX_BACKOFF,
            retry_on_status: BTreeSet::from([http::StatusCode::TOO_MANY_REQUESTS.as_u16()]),
            jitter: true,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, DEFAULT_BASE_BACKOFF)
    }

    /// Sets the cap for a single delay.
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// Replaces the set of retryable status codes. 5xx stay retryable regardless.
    pub fn with_retry_on_status(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.retry_on_status = codes.into_iter().collect();
        self
    }

    /// Disables jitter, making delays deterministic.
    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Returns the delay before retry `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let multiplier = 2u32.saturating_pow(attempt.min(31) as u32);
        // Capped before jitter too, so the float product stays finite.
        let delay = self
            .base_backoff
            .saturating_mul(multiplier)
            .min(self.max_backoff);

        let delay = if self.jitter {
            let factor = rand::thread_rng().gen_range(JITTER_RANGE);
            Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(self.max_backoff)
        } else {
            delay
        };

        delay.min(self.max_backoff)
    }

    /// Returns `true` if another attempt may fix `error`.
    ///
    /// Transport failures and 5xx are always retryable. Other status codes are
    /// retried only when listed in `retry_on_status`.
    pub fn should_retry(&self, error: &Error) -> bool {
        match error {
            Error::Network(_) | Error::Timeout | Error::Transport(_) => true,
            Error::HttpError { status, .. } => {
                status.is_server_error() || self.retry_on_status.contains(&status.as_u16())
            }
            _ => false,
        }
    }
}
