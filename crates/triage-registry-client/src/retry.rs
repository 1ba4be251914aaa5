//! Backoff for registry lookups.
//!
//! Only transport errors are retried; any HTTP status is an answer. Every
//! lookup runs against a budget: a retry whose backoff would end past the
//! budget is not attempted, and the last transport error is returned
//! instead. The budget normally equals the validator's registry timeout.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry. Doubles on each further retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

/// Default time budget for one lookup, retries included.
pub const DEFAULT_BUDGET: Duration = Duration::from_millis(2000);

/// How often, and for how long, a failed lookup is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Total time one lookup may spend, measured from its first attempt.
    pub budget: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            budget: DEFAULT_BUDGET,
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `retry` (zero-based).
    pub fn delay(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }

    /// Run `attempt` until it succeeds, the retries run out, or the next
    /// backoff would overrun the budget.
    pub(crate) async fn run<F, Fut, T, E>(&self, attempt: F) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        // `None` only when the budget overflows the clock, i.e. unbounded.
        let deadline = Instant::now().checked_add(self.budget);
        let mut retry = 0;
        loop {
            let err = match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let delay = self.delay(retry);
            let overruns = match (Instant::now().checked_add(delay), deadline) {
                (Some(resume), Some(deadline)) => resume >= deadline,
                (resume, _) => resume.is_none(),
            };
            if retry >= self.max_retries || overruns {
                tracing::debug!(attempts = retry + 1, "registry request abandoned: {err}");
                return Err(err);
            }

            tracing::warn!(
                retry = retry + 1,
                max_retries = self.max_retries,
                delay_ms = delay.as_millis() as u64,
                "registry request failed, retrying: {err}"
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }
}
