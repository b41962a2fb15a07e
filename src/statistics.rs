//! Counters describing the activity of one [`ApifyClient`](crate::ApifyClient).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Call statistics shared by every resource client derived from one top-level client.
///
/// All updates are increments, so they are safe to issue from concurrent
/// requests. Read a consistent-enough view with [`Statistics::snapshot`].
#[derive(Debug)]
pub struct Statistics {
    calls: AtomicU64,
    requests: AtomicU64,
    rate_limit_errors: Mutex<Vec<u64>>,
}

/// A point-in-time copy of [`Statistics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    /// Number of public API method invocations.
    pub calls: u64,
    /// Number of physical HTTP attempts, retries included.
    pub requests: u64,
    /// Number of 429 responses, indexed by the attempt that received them.
    pub rate_limit_errors: Vec<u64>,
}

impl Statistics {
    /// Creates statistics with `retry_budget` rate-limit slots.
    pub fn new(retry_budget: usize) -> Self {
        Self {
            calls: AtomicU64::new(0),
            requests: AtomicU64::new(0),
            rate_limit_errors: Mutex::new(vec![0; retry_budget]),
        }
    }

    pub(crate) fn add_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a 429 received on attempt `attempt` (0-indexed).
    ///
    /// The histogram grows when the attempt index is past the configured budget,
    /// which happens for the final attempt of an exhausted budget.
    pub(crate) fn add_rate_limit_error(&self, attempt: usize) {
        let mut errors = self
            .rate_limit_errors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if errors.len() <= attempt {
            errors.resize(attempt + 1, 0);
        }
        errors[attempt] += 1;
    }

    /// Number of public API method invocations.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of physical HTTP attempts, retries included.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Copies the current counters.
    pub fn snapshot(&self) -> StatisticsSnapshot {
        let rate_limit_errors = self
            .rate_limit_errors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        StatisticsSnapshot {
            calls: self.calls(),
            requests: self.requests(),
            rate_limit_errors,
        }
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new(crate::retry::DEFAULT_MAX_RETRIES)
    }
}
