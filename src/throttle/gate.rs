//! Serialized request gate
//!
//! At most one request is in flight through a gate at any time, and a new
//! request starts no sooner than `interval` after the previous one finished.
//! Holding a `GatePermit` is what "in flight" means: the spacing clock starts
//! when the permit is dropped.

use std::time::Duration;

use log::debug;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

/// Serializes access to a rate-sensitive collaborator
#[derive(Debug)]
pub struct RequestGate {
    interval: Duration,
    last_finished: Mutex<Option<Instant>>,
}

/// Exclusive right to issue one request
///
/// Dropping the permit records the completion time.
#[derive(Debug)]
pub struct GatePermit<'a> {
    guard: MutexGuard<'a, Option<Instant>>,
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        *self.guard = Some(Instant::now());
    }
}

impl RequestGate {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_finished: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for exclusive access and for the spacing interval to elapse
    pub async fn acquire(&self) -> GatePermit<'_> {
        let guard = self.last_finished.lock().await;
        if let Some(last) = *guard {
            let ready_at = last + self.interval;
            if ready_at > Instant::now() {
                debug!("Request gate waiting {}ms", (ready_at - Instant::now()).as_millis());
                tokio::time::sleep_until(ready_at).await;
            }
        }
        GatePermit { guard }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_request_is_not_delayed() {
        let gate = RequestGate::new(Duration::from_millis(800));
        let start = Instant::now();
        drop(gate.acquire().await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_requests_are_spaced() {
        let gate = RequestGate::new(Duration::from_millis(800));
        let start = Instant::now();
        for _ in 0..4 {
            drop(gate.acquire().await);
        }
        assert!(start.elapsed() >= Duration::from_millis(3 * 800));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_are_serialized() {
        let gate = Arc::new(RequestGate::new(Duration::from_millis(100)));
        let in_flight = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let tasks: Vec<_> = (0..5)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let in_flight = Arc::clone(&in_flight);
                tokio::spawn(async move {
                    let _permit = gate.acquire().await;
                    let now = in_flight.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    assert_eq!(now, 0, "two requests in flight");
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    in_flight.fetch_sub(1, std::sync::atomic::Ordering::SeqCst);
                })
            })
            .collect();

        for task in tasks {
            task.await.expect("task");
        }
    }
}
