//! Bounded exponential backoff for transient storage failures.

use std::future::Future;
use std::time::Duration;

use berth_core::StorageError;
use tokio::time::sleep;

/// Retry configuration for booking attempts.
///
/// Defaults: 3 retries, 20ms initial delay, 1s cap, doubling each attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(20),
            max_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
            ..Self::default()
        }
    }

    /// delay = initial_delay * multiplier^attempt, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return self.initial_delay.min(self.max_delay);
        }

        let delay_ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let delay = Duration::from_millis(delay_ms as u64);

        delay.min(self.max_delay)
    }
}

/// Outcome of one attempt: either a final error or a storage error that may be retried.
#[derive(Debug)]
pub enum AttemptError<E> {
    Fatal(E),
    Storage(StorageError),
}

impl<E> From<StorageError> for AttemptError<E> {
    fn from(err: StorageError) -> Self {
        AttemptError::Storage(err)
    }
}

/// Failure after the retry loop finished.
#[derive(Debug)]
pub enum RetryError<E> {
    Fatal(E),
    Exhausted { attempts: usize, last: StorageError },
}

/// Run `operation` until it succeeds, fails fatally, fails with a non-transient
/// storage error, or runs out of retries.
pub async fn retry_with_backoff<F, Fut, T, E>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AttemptError<E>>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!("{} succeeded after {} retries", label, attempt);
                }
                return Ok(value);
            }
            Err(AttemptError::Fatal(err)) => return Err(RetryError::Fatal(err)),
            Err(AttemptError::Storage(err)) => {
                if !err.is_transient() || attempt >= policy.max_retries {
                    return Err(RetryError::Exhausted {
                        attempts: attempt + 1,
                        last: err,
                    });
                }

                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                    label,
                    attempt + 1,
                    policy.max_retries + 1,
                    err,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_delay_is_exponential_and_capped() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100), Duration::from_millis(500));

        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(2));
        let calls = AtomicUsize::new(0);

        let result: Result<u32, RetryError<()>> = retry_with_backoff(&policy, "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(AttemptError::Storage(StorageError::Unavailable("down".into())))
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert!(matches!(result, Ok(7)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1), Duration::from_millis(2));
        let calls = AtomicUsize::new(0);

        let result: Result<(), RetryError<()>> = retry_with_backoff(&policy, "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AttemptError::Storage(StorageError::Conflict(1))) }
        })
        .await;

        match result {
            Err(RetryError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last, StorageError::Conflict(1));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let policy = RetryPolicy::default();
        let calls = AtomicUsize::new(0);

        let result: Result<(), RetryError<&str>> = retry_with_backoff(&policy, "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AttemptError::Storage(StorageError::Backend("bad column".into()))) }
        })
        .await;

        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 1, .. })));

        let fatal: Result<(), RetryError<&str>> =
            retry_with_backoff(&policy, "test", || async { Err(AttemptError::Fatal("nope")) }).await;
        assert!(matches!(fatal, Err(RetryError::Fatal("nope"))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
