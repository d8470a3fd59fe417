//! Liveness scheduling
//!
//! Drives a `LivenessProbe` over every unprobed record of a `LinkIndex` with
//! bounded concurrency, reports progress, checkpoints, and folds each outcome
//! into its record.

pub mod checkpoint;
pub mod progress;
pub mod worker_pool;

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, info, warn};
use serde::Serialize;

pub use checkpoint::{Checkpoint, CheckpointWriter};
pub use progress::{LogProgress, NoOpProgress, ProgressReporter};
pub use worker_pool::WorkerPool;

use crate::link_index::{LinkIndex, LinkStatus};
use crate::probe::{LivenessProbe, ProbeOutcome};

/// Counts from one scheduler run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerSummary {
    pub checked: usize,
    pub live: usize,
    pub dead: usize,
}

/// Probes every `unknown` record exactly once
pub struct LivenessScheduler<P> {
    probe: P,
    pool: WorkerPool,
    checkpoint: Option<CheckpointWriter>,
    progress: Box<dyn ProgressReporter>,
}

impl<P: LivenessProbe> LivenessScheduler<P> {
    #[must_use]
    pub fn new(probe: P, concurrency: usize) -> Self {
        Self {
            probe,
            pool: WorkerPool::new(concurrency),
            checkpoint: None,
            progress: Box::new(NoOpProgress),
        }
    }

    #[must_use]
    pub fn with_checkpoint(mut self, writer: CheckpointWriter) -> Self {
        self.checkpoint = Some(writer);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.progress = Box::new(reporter);
        self
    }

    /// Probe all `unknown` records and move each to `live` or `dead`
    ///
    /// Individual failures are recorded on the record, never returned.
    pub async fn run(&self, index: &mut LinkIndex) -> SchedulerSummary {
        let urls = index.urls_with_status(LinkStatus::Unknown);
        let total = urls.len();
        self.progress.report_started(total);

        let completed = &AtomicUsize::new(0);
        let outcomes: Vec<ProbeOutcome> = self
            .pool
            .run(&urls, move |_, url| async move {
                let outcome = self.probe.probe(url).await;
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;

                if !outcome.is_live() {
                    debug!(
                        "Dead: {url} ({})",
                        outcome
                            .category()
                            .map_or_else(|| "unknown".to_string(), |c| c.to_string())
                    );
                }
                self.progress.report_checked(done, total, url, outcome.is_live());
                if let Some(writer) = &self.checkpoint {
                    writer.record(done, total).await;
                }
                outcome
            })
            .await;

        let mut summary = SchedulerSummary::default();
        for (url, outcome) in urls.iter().zip(&outcomes) {
            let Some(record) = index.get_mut(url) else {
                continue;
            };
            if let Err(e) = record.apply_probe(outcome) {
                warn!("{e}");
                continue;
            }
            summary.checked += 1;
            if outcome.is_live() {
                summary.live += 1;
            } else {
                summary.dead += 1;
            }
        }

        self.progress.report_completed(total);
        info!(
            "Liveness: {} checked, {} live, {} dead",
            summary.checked, summary.live, summary.dead
        );
        summary
    }
}
