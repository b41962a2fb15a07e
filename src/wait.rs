//! Polling until an asynchronous job (a build or a run) finishes.

use crate::models::ActorJobStatus;
use crate::resource::ResourceClient;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// A resource snapshot that carries a job status.
pub trait JobSnapshot {
    /// The current status.
    fn status(&self) -> ActorJobStatus;
}

/// How long and how often to poll.
///
/// # Examples
///
/// ```
/// use apify_client::WaitForFinishOptions;
/// use std::time::Duration;
///
/// let options = WaitForFinishOptions::new()
///     .wait_secs(120)
///     .poll_interval(Duration::from_secs(1));
/// assert_eq!(options.wait_secs, Some(120));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitForFinishOptions {
    /// Maximum wait in seconds. `None` waits until the job finishes.
    pub wait_secs: Option<u64>,
    /// Delay before the second poll.
    pub poll_interval: Duration,
    /// Upper bound for the delay between polls.
    pub max_poll_interval: Duration,
    /// Factor the delay grows by after each poll.
    pub backoff_factor: u32,
}

impl Default for WaitForFinishOptions {
    fn default() -> Self {
        Self {
            wait_secs: None,
            poll_interval: Duration::from_millis(250),
            max_poll_interval: Duration::from_secs(5),
            backoff_factor: 2,
        }
    }
}

impl WaitForFinishOptions {
    /// Waits indefinitely with the default poll schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum wait.
    pub fn wait_secs(mut self, wait_secs: u64) -> Self {
        self.wait_secs = Some(wait_secs);
        self
    }

    /// Sets the initial delay between polls.
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets the cap for the delay between polls.
    pub fn max_poll_interval(mut self, max_poll_interval: Duration) -> Self {
        self.max_poll_interval = max_poll_interval;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::Validation("poll_interval must be greater than zero".to_string()));
        }
        if self.max_poll_interval < self.poll_interval {
            return Err(Error::Validation(
                "max_poll_interval must not be shorter than poll_interval".to_string(),
            ));
        }
        if self.backoff_factor == 0 {
            return Err(Error::Validation("backoff_factor must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Polls `resource` until its status is terminal or `wait_secs` elapse.
///
/// The first fetch happens immediately. Reaching the deadline is not an error:
/// the latest, possibly unfinished, snapshot is returned and the caller
/// inspects its status. A request already in flight when the deadline passes
/// is allowed to complete. Returns `Ok(None)` if the resource does not exist.
///
/// # Errors
///
/// Only errors from the underlying `get` (validation, client errors or an
/// exhausted retry budget) are propagated.
pub async fn wait_for_finish<T>(
    resource: &ResourceClient,
    options: &WaitForFinishOptions,
) -> Result<Option<T>>
where
    T: DeserializeOwned + JobSnapshot,
{
    options.validate()?;

    // A wait too long to represent as an instant is the same as no deadline.
    let deadline = options
        .wait_secs
        .and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs)));
    let mut interval = options.poll_interval;
    let mut polls = 0u32;

    loop {
        let snapshot = match resource.get::<T>().await? {
            Some(snapshot) => snapshot,
            None => return Ok(None),
        };
        polls += 1;

        let status = snapshot.status();
        tracing::debug!(
            id = resource.id().unwrap_or_default(),
            status = ?status,
            polls = polls,
            "Polled job status"
        );

        if status.is_terminal() {
            return Ok(Some(snapshot));
        }

        let delay = match deadline {
            None => interval,
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    tracing::debug!(
                        id = resource.id().unwrap_or_default(),
                        polls = polls,
                        "Stopped waiting for job before it finished"
                    );
                    return Ok(Some(snapshot));
                }
                interval.min(deadline - now)
            }
        };

        tokio::time::sleep(delay).await;
        interval = interval
            .saturating_mul(options.backoff_factor)
            .min(options.max_poll_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_schedule_validated() {
        assert!(WaitForFinishOptions::new().validate().is_ok());
        assert!(WaitForFinishOptions::new()
            .poll_interval(Duration::ZERO)
            .validate()
            .is_err());
        assert!(WaitForFinishOptions::new()
            .poll_interval(Duration::from_secs(10))
            .validate()
            .is_err());
    }
}
