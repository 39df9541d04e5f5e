// src/retry.rs
//! Exponential backoff for calls whose failures can be classified as retryable.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use metrics::counter;

/// `max_attempts` includes the first try. The wait before attempt `k + 1` is
/// `base_delay * factor^(k - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub factor: u32,
}

impl Default for RetryPolicy {
    /// 3 attempts, waiting 4s then 8s.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(4),
            factor: 2,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error; holds the last one.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
    /// A non-retryable error ended the loop early.
    #[error("failed on attempt {attempt}: {error}")]
    Fatal { attempt: u32, error: E },
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, factor: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            factor: factor.max(1),
        }
    }

    /// Delay slept after failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1);
        let mult = self.factor.saturating_pow(exp);
        self.base_delay.saturating_mul(mult)
    }

    /// Run `op` until it succeeds, fails with an error `is_retryable` rejects,
    /// or the attempt budget is spent. `op` receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut, P>(
        &self,
        op_name: &'static str,
        mut op: F,
        is_retryable: P,
    ) -> Result<T, RetryError<E>>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let max = self.max_attempts.max(1);
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(v) => return Ok(v),
                Err(e) if !is_retryable(&e) => {
                    return Err(RetryError::Fatal { attempt, error: e });
                }
                Err(e) if attempt >= max => {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: e,
                    });
                }
                Err(e) => {
                    let delay = self.delay_after(attempt);
                    tracing::warn!(
                        op = op_name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retryable failure, backing off"
                    );
                    counter!("digest_retries_total", "op" => op_name).increment(1);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
