use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::UpstreamError;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_BACKOFF: Duration = Duration::from_millis(200);
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Bounded retry with doubling backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_backoff: Duration,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_BACKOFF, DEFAULT_MAX_BACKOFF)
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
            max_backoff: max_backoff.max(base_backoff),
        }
    }

    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the next attempt, or `None` once `attempts` used up the budget.
    pub fn next_delay(&self, attempts: u32) -> Option<Duration> {
        if attempts >= self.max_attempts {
            return None;
        }
        let exponent = attempts.saturating_sub(1).min(16);
        let delay = self.base_backoff.saturating_mul(1u32 << exponent);
        Some(delay.min(self.max_backoff))
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error, or
    /// the attempt budget is spent. The last error is returned.
    pub async fn run<T, F, Fut>(&self, route: &'static str, operation: F) -> Result<T, UpstreamError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        self.run_when(route, UpstreamError::is_retryable, operation)
            .await
    }

    /// Like [`RetryPolicy::run`], but only errors accepted by `retryable` are retried.
    pub async fn run_when<T, F, Fut, P>(
        &self,
        route: &'static str,
        retryable: P,
        mut operation: F,
    ) -> Result<T, UpstreamError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
        P: Fn(&UpstreamError) -> bool,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match operation(attempts).await {
                Ok(value) => return Ok(value),
                Err(err) if retryable(&err) => match self.next_delay(attempts) {
                    Some(delay) => {
                        warn!(route, attempts, error = %err, ?delay, "retrying claims api call");
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(err),
                },
                Err(err) => return Err(err),
            }
        }
    }
}
