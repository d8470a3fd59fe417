//! Progress reporting abstraction for liveness runs
//!
//! Defines the `ProgressReporter` trait and two implementations: one that
//! logs, one that does nothing.

use log::info;

/// Trait for reporting probe progress
///
/// Called from inside the worker pool, so implementations must be cheap and
/// must not block.
pub trait ProgressReporter: Send + Sync {
    /// A run over `total` URLs is starting
    fn report_started(&self, total: usize);

    /// One URL finished; `completed` counts finished URLs including this one
    fn report_checked(&self, completed: usize, total: usize, url: &str, live: bool);

    /// The run finished
    fn report_completed(&self, total: usize);
}

/// Progress reporter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_started(&self, _total: usize) {}

    #[inline(always)]
    fn report_checked(&self, _completed: usize, _total: usize, _url: &str, _live: bool) {}

    #[inline(always)]
    fn report_completed(&self, _total: usize) {}
}

/// Logs a progress line every `every` completions
#[derive(Debug, Clone, Copy)]
pub struct LogProgress {
    every: usize,
}

impl LogProgress {
    #[must_use]
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl ProgressReporter for LogProgress {
    fn report_started(&self, total: usize) {
        info!("Checking {total} URLs");
    }

    fn report_checked(&self, completed: usize, total: usize, _url: &str, _live: bool) {
        if completed % self.every == 0 && completed < total {
            info!("Checked {completed}/{total}");
        }
    }

    fn report_completed(&self, total: usize) {
        info!("Checked {total}/{total}");
    }
}
