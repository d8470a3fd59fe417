//! Bounded worker pool over a shared work index
//!
//! `N` workers each pull the next index from one atomic counter until the
//! items run out. Every item is handed to exactly one worker, and a slow item
//! only holds up the worker that drew it.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;

/// Fixed-size pool of cooperative workers
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    concurrency: usize,
}

impl WorkerPool {
    /// Create a pool; a concurrency of 0 is treated as 1
    #[must_use]
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run `task` once per item and return the results in item order
    ///
    /// `task` receives the item's index and the item. Completion order is
    /// unspecified.
    pub async fn run<'a, I, T, F, Fut>(&self, items: &'a [I], task: F) -> Vec<T>
    where
        F: Fn(usize, &'a I) -> Fut,
        Fut: Future<Output = T>,
    {
        let next = &AtomicUsize::new(0);
        let task = &task;
        let workers = self.concurrency.min(items.len());

        let batches = join_all((0..workers).map(|_| async move {
            let mut done = Vec::new();
            loop {
                let position = next.fetch_add(1, Ordering::Relaxed);
                let Some(item) = items.get(position) else {
                    break;
                };
                done.push((position, task(position, item).await));
            }
            done
        }))
        .await;

        let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(items.len()).collect();
        for (position, result) in batches.into_iter().flatten() {
            slots[position] = Some(result);
        }
        slots.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn results_follow_item_order() {
        let items: Vec<u64> = (0..20).collect();
        let results = WorkerPool::new(4)
            .run(&items, |_, n| {
                let n = *n;
                async move {
                    // later items finish first
                    tokio::time::sleep(Duration::from_millis(20 - n)).await;
                    n * 2
                }
            })
            .await;
        assert_eq!(results, items.iter().map(|n| n * 2).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn empty_input_spawns_nothing() {
        let items: Vec<u8> = Vec::new();
        let results: Vec<u8> = WorkerPool::new(8).run(&items, |_, n| async move { *n }).await;
        assert!(results.is_empty());
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        assert_eq!(WorkerPool::new(0).concurrency(), 1);
    }
}
