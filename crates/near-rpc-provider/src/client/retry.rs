//! Retry-with-delay combinator for fallible async operations.
//!
//! The combinator never inspects errors; deciding what is worth retrying is
//! the caller's job. Each [`Retrying::call`] starts again from the first
//! attempt, so concurrent calls share no state.

use std::future::Future;
use std::time::Duration;

/// Delay used by [`retry_fixed`] between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Exponential backoff schedule.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based): doubles each time, capped.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(
            self.initial_delay_ms
                .saturating_mul(factor)
                .min(self.max_delay_ms),
        )
    }

    /// Wrap `f` with this schedule.
    pub fn wrap<F>(&self, f: F) -> Retrying<F, BackoffFn> {
        let config = self.clone();
        retry(f, self.max_retries, Box::new(move |attempt| config.delay(attempt)))
    }
}

/// Boxed delay schedule produced by [`RetryConfig::wrap`].
pub type BackoffFn = Box<dyn Fn(u32) -> Duration + Send + Sync>;

/// A function wrapped with retry behavior. Created by [`retry`].
pub struct Retrying<F, D> {
    f: F,
    max_attempts: u32,
    delay: D,
}

/// Wrap `f` so a failed call is retried up to `max_attempts` times.
///
/// Before retry `n` (starting at 1) the wrapper sleeps for `delay(n)`. The
/// underlying function runs at most `max_attempts + 1` times and the last
/// failure is returned unchanged.
pub fn retry<F, D>(f: F, max_attempts: u32, delay: D) -> Retrying<F, D>
where
    D: Fn(u32) -> Duration,
{
    Retrying {
        f,
        max_attempts,
        delay,
    }
}

/// [`retry`] with a fixed [`DEFAULT_RETRY_DELAY`].
pub fn retry_fixed<F>(f: F, max_attempts: u32) -> Retrying<F, fn(u32) -> Duration> {
    retry(f, max_attempts, fixed_delay as fn(u32) -> Duration)
}

fn fixed_delay(_attempt: u32) -> Duration {
    DEFAULT_RETRY_DELAY
}

impl<F, D> Retrying<F, D>
where
    D: Fn(u32) -> Duration,
{
    /// Invoke the wrapped function with `args`, retrying on failure.
    pub async fn call<A, Fut, T, E>(&self, args: A) -> Result<T, E>
    where
        A: Clone,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            match (self.f)(args.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= self.max_attempts => return Err(err),
                Err(_) => {
                    attempt += 1;
                    let delay = (self.delay)(attempt);
                    tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Number of retries after the first attempt.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
