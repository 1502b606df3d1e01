use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Attempt budget and the base of the exponential backoff curve.
#[derive(Debug, Clone)]
pub struct RetryOptions {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryOptions {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Wait before the attempt following `attempt` (1-indexed): base delay
    /// doubled per failed attempt, so base, 2x, 4x, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

/// Re-runs `op` until it succeeds or the attempt budget is spent, sleeping
/// the backoff delay between attempts. Every failure is retried the same
/// way; the wrapper does not inspect the error. Attempts are strictly
/// sequential: the next one starts only after the previous failure and its
/// backoff wait have completed.
pub async fn with_retry<T, E, F, Fut>(mut op: F, options: &RetryOptions) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= options.max_attempts => {
                warn!("attempt {}/{} failed, giving up: {}", attempt, options.max_attempts, err);
                return Err(err);
            }
            Err(err) => {
                let delay = options.backoff(attempt);
                warn!(
                    "attempt {}/{} failed, retrying in {:?}: {}",
                    attempt, options.max_attempts, delay, err
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result = with_retry(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { if n < 3 { Err("boom") } else { Ok(n) } }
            },
            &RetryOptions::default(),
        )
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // two failures: 1000ms + 2000ms of backoff, nothing else
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), &str> = with_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("always") }
            },
            &RetryOptions::default(),
        )
        .await;

        assert_eq!(result, Err("always"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_success_skips_backoff() {
        let started = Instant::now();

        let result = with_retry(|| async { Ok::<_, &str>(42) }, &RetryOptions::default()).await;

        assert_eq!(result, Ok(42));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_options_shape_the_backoff_curve() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();
        let options = RetryOptions::new(4, Duration::from_millis(100));

        let result: Result<(), &str> = with_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("always") }
            },
            &options,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 100 + 200 + 400
        assert_eq!(started.elapsed(), Duration::from_millis(700));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let options = RetryOptions::default();
        assert_eq!(options.backoff(1), Duration::from_millis(1000));
        assert_eq!(options.backoff(2), Duration::from_millis(2000));
        assert_eq!(options.backoff(3), Duration::from_millis(4000));
    }
}
