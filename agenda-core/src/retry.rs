//! Bounded retry with exponential backoff.
//!
//! Every failure is treated as transient: the operation is attempted up to
//! `max_attempts` times, sleeping `base_delay * 2^attempt` between attempts,
//! and the last error is returned unchanged once attempts run out. There is
//! no jitter and no cancellation; a sequence runs to success or exhaustion.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Attempt and delay configuration for [`retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first. Values below 1 are treated as 1.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}

impl Default for RetryPolicy {
    /// 3 attempts, 1s base delay.
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            base_delay_ms: base_delay.as_millis() as u64,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Wait after the failed attempt numbered `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay().saturating_mul(factor)
    }

    /// Sum of every wait in a fully exhausted sequence.
    pub fn worst_case_wait(&self) -> Duration {
        (0..self.attempts() - 1).map(|attempt| self.delay_for(attempt)).sum()
    }
}

/// Run `op` until it succeeds or `policy` runs out of attempts.
///
/// Returns the first success, or the error of the final attempt.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        tracing::debug!(attempt = attempt + 1, max_attempts = attempts, "store attempt");

        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt + 1 >= attempts => {
                tracing::debug!(attempts, error = %err, "retries exhausted");
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "attempt failed, backing off"
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
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1000))
    }

    #[test]
    fn test_delays_double() {
        let policy = policy();
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
        assert_eq!(policy.worst_case_wait(), Duration::from_millis(3000));
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        let policy = RetryPolicy::new(0, Duration::from_millis(10));
        assert_eq!(policy.attempts(), 1);
        assert_eq!(policy.worst_case_wait(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_has_no_delay() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let started = Instant::now();

        let result: Result<&str, String> = retry(&policy(), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok("done")
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let waits = Mutex::new(Vec::new());
        let last = Mutex::new(Instant::now());
        let calls = AtomicU32::new(0);
        let (waits, last, calls) = (&waits, &last, &calls);

        let result: Result<u32, String> = retry(&policy(), move || async move {
            let now = Instant::now();
            let mut prev = last.lock().unwrap();
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n > 0 {
                waits.lock().unwrap().push(now - *prev);
            }
            *prev = now;
            if n < 2 { Err(format!("failure {}", n)) } else { Ok(n) }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *waits.lock().unwrap(),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let started = Instant::now();

        let result: Result<(), String> = retry(&policy(), move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Err(format!("failure {}", n))
        })
        .await;

        assert_eq!(result, Err("failure 2".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }
}
