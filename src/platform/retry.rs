//! Bounded retry with randomized exponential backoff.

use crate::error::Result;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// How often and how patiently to retry a flaky API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Base of the exponential backoff window
    pub multiplier: Duration,
    /// Upper bound of any single wait
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            multiplier: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Window for the wait after failed attempt number `attempt` (1-based).
    ///
    /// The actual wait is drawn uniformly from `[0, window]`.
    pub fn backoff_window(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(31));
        self.multiplier.saturating_mul(factor).min(self.max_delay)
    }

    fn jittered_delay(&self, attempt: u32) -> Duration {
        let window = u64::try_from(self.backoff_window(attempt).as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::thread_rng().gen_range(0..=window))
    }
}

/// Run `op` until it succeeds or `policy.max_attempts` is exhausted.
///
/// Returns the last error once out of attempts. Only use this for reads:
/// retrying a comment or merge could duplicate the side effect.
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) => {
                let delay = policy.jittered_delay(attempt);
                warn!(
                    what,
                    attempt,
                    max_attempts,
                    delay = ?delay,
                    error = %e,
                    "retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
