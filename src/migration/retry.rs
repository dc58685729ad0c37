use crate::registry::RegistryError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackoffStrategy {
    Fixed,
    Linear,
    Exponential,
}

/// Retry bounds for one record's mutation. Never shared between records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub max_delay: Duration,
    pub backoff: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff: BackoffStrategy::Exponential,
        }
    }
}

impl RetryPolicy {
    /// Policy with no sleeping between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff: BackoffStrategy::Fixed,
        }
    }

    /// Delay before retrying after `attempt` (1-based) failed.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = match self.backoff {
            BackoffStrategy::Fixed => 1,
            BackoffStrategy::Linear => attempt.max(1),
            BackoffStrategy::Exponential => 2u32.saturating_pow(attempt.saturating_sub(1)),
        };
        self.delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryFailure {
    pub attempts: u32,
    pub error: RegistryError,
    /// True when every attempt hit a retryable error.
    pub exhausted: bool,
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up.
pub async fn retry_registry_call<T, O, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut operation: O,
) -> Result<(T, u32), RetryFailure>
where
    O: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RegistryError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match operation().await {
            Ok(value) => return Ok((value, attempts)),
            Err(error) => {
                if !error.is_retryable() || attempts >= max_attempts {
                    return Err(RetryFailure {
                        attempts,
                        exhausted: error.is_retryable(),
                        error,
                    });
                }

                let backoff = policy.delay_after(attempts);
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    what, attempts, max_attempts, error, backoff
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }
}
