//! Getter methods for `LinkCheckConfig`
//!
//! This module provides all the accessor methods for retrieving configuration
//! values from a `LinkCheckConfig` instance.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::LinkCheckConfig;
use crate::archive::SnapshotUrls;
use crate::heuristics::HostRule;
use crate::throttle::RetryPolicy;
use crate::utils::{
    DEFAULT_REPORT_DIR_NAME, LIVENESS_REPORT_FILE, PROGRESS_FILE, REPLACEMENT_REPORT_FILE,
};

impl LinkCheckConfig {
    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Report directory, `<root>/.linkrot` unless configured
    #[must_use]
    pub fn report_dir(&self) -> PathBuf {
        self.report_dir
            .clone()
            .unwrap_or_else(|| self.root_dir.join(DEFAULT_REPORT_DIR_NAME))
    }

    #[must_use]
    pub fn liveness_report_path(&self) -> PathBuf {
        self.report_dir().join(LIVENESS_REPORT_FILE)
    }

    #[must_use]
    pub fn replacement_report_path(&self) -> PathBuf {
        self.report_dir().join(REPLACEMENT_REPORT_FILE)
    }

    #[must_use]
    pub fn progress_path(&self) -> PathBuf {
        self.report_dir().join(PROGRESS_FILE)
    }

    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    #[must_use]
    pub fn ignored_dirs(&self) -> &[String] {
        &self.ignored_dirs
    }

    #[must_use]
    pub fn skip_patterns(&self) -> &[String] {
        &self.skip_patterns
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    #[must_use]
    pub fn max_redirects(&self) -> u8 {
        self.max_redirects
    }

    #[must_use]
    pub fn checkpoint_interval(&self) -> usize {
        self.checkpoint_interval
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn archive_endpoint(&self) -> &str {
        &self.archive_endpoint
    }

    #[must_use]
    pub fn archive_web_prefix(&self) -> &str {
        &self.archive_web_prefix
    }

    #[must_use]
    pub fn snapshot_urls(&self) -> SnapshotUrls {
        SnapshotUrls::new(self.archive_web_prefix.as_str())
    }

    #[must_use]
    pub fn archive_delay(&self) -> Duration {
        Duration::from_millis(self.archive_delay_ms)
    }

    #[must_use]
    pub fn archive_timeout(&self) -> Duration {
        Duration::from_millis(self.archive_timeout_ms)
    }

    #[must_use]
    pub fn archive_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.archive_max_attempts,
            Duration::from_millis(self.archive_retry_base_ms),
        )
    }

    #[must_use]
    pub fn archive_timestamp(&self) -> Option<&str> {
        self.archive_timestamp.as_deref()
    }

    #[must_use]
    pub fn revalidate_delay(&self) -> Duration {
        Duration::from_millis(self.revalidate_delay_ms)
    }

    #[must_use]
    pub fn enable_heuristics(&self) -> bool {
        self.enable_heuristics
    }

    #[must_use]
    pub fn heuristic_rules(&self) -> &[HostRule] {
        &self.heuristic_rules
    }

    #[must_use]
    pub fn resolve_all_dead(&self) -> bool {
        self.resolve_all_dead
    }

    #[must_use]
    pub fn annotate_unresolved(&self) -> bool {
        self.annotate_unresolved
    }

    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}
