//! Retry with linear backoff
//!
//! The delay before attempt `n + 1` is `n × base_delay`, so with the archive
//! defaults (3 attempts, 2s base) a lookup that keeps failing waits 2s and
//! then 4s before giving up.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};

use crate::error::LinkrotResult;

/// How many times to try and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay unit multiplied by the attempt number
    pub base_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay after the given failed attempt (1-based)
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            crate::utils::DEFAULT_ARCHIVE_MAX_ATTEMPTS,
            Duration::from_millis(crate::utils::DEFAULT_ARCHIVE_RETRY_BASE_MS),
        )
    }
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out
///
/// Only errors for which `LinkrotError::is_transient` holds are retried.
/// The last error is returned when every attempt failed.
pub async fn retry_with_backoff<F, Fut, T>(policy: RetryPolicy, mut operation: F) -> LinkrotResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = LinkrotResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Succeeded on attempt {attempt}/{max_attempts}");
                }
                return Ok(value);
            }
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) if attempt >= max_attempts => {
                warn!("Giving up after {max_attempts} attempts: {e}");
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                debug!(
                    "Attempt {attempt}/{max_attempts} failed ({e}), retrying in {}ms",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;
    use crate::error::LinkrotError;

    const POLICY: RetryPolicy = RetryPolicy::new(3, Duration::from_millis(2_000));

    #[test]
    fn delay_grows_linearly() {
        assert_eq!(POLICY.delay_for(1), Duration::from_millis(2_000));
        assert_eq!(POLICY.delay_for(2), Duration::from_millis(4_000));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_use_every_attempt() {
        let calls = &AtomicU32::new(0);
        let start = Instant::now();

        let result: LinkrotResult<()> = retry_with_backoff(POLICY, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(LinkrotError::MalformedResponse("truncated".into()))
        })
        .await;

        assert!(matches!(result, Err(LinkrotError::MalformedResponse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(6_000));
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_fail_fast() {
        let calls = &AtomicU32::new(0);

        let result: LinkrotResult<()> = retry_with_backoff(POLICY, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(LinkrotError::ArchiveStatus(400))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failure() {
        let calls = &AtomicU32::new(0);

        let result = retry_with_backoff(POLICY, move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(LinkrotError::ArchiveStatus(503))
            } else {
                Ok("snapshot")
            }
        })
        .await;

        assert_eq!(result.ok(), Some("snapshot"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
