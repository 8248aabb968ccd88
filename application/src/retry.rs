//! Bounded retry with exponential backoff.
//!
//! Stateless: a [`RetryPolicy`] is plain data and the retry functions keep
//! nothing between calls, so independent operations can share one policy.
//! Both suspending ([`retry_async`]) and blocking ([`retry_blocking`]) call
//! styles are provided.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Classifies errors as transient (worth another attempt) or terminal.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

/// Attempt count and backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first (0 is treated as 1)
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after every further failure
    pub backoff_factor: f64,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, backoff_factor: f64) -> Self {
        Self {
            max_attempts,
            initial_delay,
            backoff_factor,
            ..Self::default()
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, 1.0)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based):
    /// `initial_delay * backoff_factor^(attempt - 1)`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let factor = if self.backoff_factor.is_finite() && self.backoff_factor > 0.0 {
            self.backoff_factor
        } else {
            1.0
        };
        let secs = self.initial_delay.as_secs_f64() * factor.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Run `op` until it succeeds, fails terminally, or attempts run out.
///
/// `op` receives the 1-based attempt number. The last error is returned
/// unchanged.
pub async fn retry_async<T, E, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + fmt::Display,
{
    retry_async_with_sleep(policy, op, tokio::time::sleep).await
}

/// [`retry_async`] with an injectable sleep function.
pub async fn retry_async_with_sleep<T, E, F, Fut, S, SFut>(
    policy: &RetryPolicy,
    mut op: F,
    mut sleep: S,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + fmt::Display,
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => {
                debug!("Attempt {} failed with non-retryable error: {}", attempt, e);
                return Err(e);
            }
            Err(e) if attempt >= max_attempts => {
                warn!("Giving up after {} attempts: {}", attempt, e);
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt, max_attempts, e, delay
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Blocking counterpart of [`retry_async`].
pub fn retry_blocking<T, E, F>(policy: &RetryPolicy, op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Result<T, E>,
    E: IsRetryable + fmt::Display,
{
    retry_blocking_with_sleep(policy, op, std::thread::sleep)
}

/// [`retry_blocking`] with an injectable sleep function.
pub fn retry_blocking_with_sleep<T, E, F, S>(
    policy: &RetryPolicy,
    mut op: F,
    mut sleep: S,
) -> Result<T, E>
where
    F: FnMut(u32) -> Result<T, E>,
    E: IsRetryable + fmt::Display,
    S: FnMut(Duration),
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => {
                debug!("Attempt {} failed with non-retryable error: {}", attempt, e);
                return Err(e);
            }
            Err(e) if attempt >= max_attempts => {
                warn!("Giving up after {} attempts: {}", attempt, e);
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt, max_attempts, e, delay
                );
                sleep(delay);
                attempt += 1;
            }
        }
    }
}
