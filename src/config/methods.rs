//! Builder methods available for all states
//!
//! This module contains methods that can be called on the builder
//! regardless of its current type state.

use std::path::PathBuf;

use super::builder::LinkCheckConfigBuilder;
use crate::heuristics::HostRule;

impl<State> LinkCheckConfigBuilder<State> {
    /// Directory for reports and the progress checkpoint
    #[must_use]
    pub fn report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.draft.report_dir = Some(dir.into());
        self
    }

    /// File extensions to scan, with or without the leading dot
    #[must_use]
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.draft.extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Directory names never descended into
    #[must_use]
    pub fn ignored_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.draft.ignored_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Substrings that exclude a URL from extraction
    ///
    /// The defaults drop local development URLs (`localhost`, `127.0.0.1`)
    /// and template interpolations (`${`). Pass an empty list to record
    /// everything.
    #[must_use]
    pub fn skip_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.draft.skip_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Number of concurrent liveness workers
    #[must_use]
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.draft.concurrency = workers;
        self
    }

    /// Timeout for each probe attempt, one redirect hop included
    #[must_use]
    pub fn probe_timeout_ms(mut self, ms: u64) -> Self {
        self.draft.probe_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn max_redirects(mut self, redirects: u8) -> Self {
        self.draft.max_redirects = redirects;
        self
    }

    /// Write the progress checkpoint every N completed probes
    #[must_use]
    pub fn checkpoint_interval(mut self, completions: usize) -> Self {
        self.draft.checkpoint_interval = completions;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.draft.user_agent = user_agent.into();
        self
    }

    /// Archive availability endpoint
    ///
    /// # Example
    /// ```rust
    /// # use kodegen_tools_linkrot::config::LinkCheckConfig;
    /// # fn main() -> anyhow::Result<()> {
    /// let dir = std::env::temp_dir();
    /// let config = LinkCheckConfig::builder()
    ///     .root_dir(&dir)
    ///     .archive_endpoint("https://archive.org/wayback/available")
    ///     .archive_delay_ms(1_000)
    ///     .build()?;
    /// assert_eq!(config.archive_delay().as_millis(), 1_000);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn archive_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.draft.archive_endpoint = endpoint.into();
        self
    }

    /// Prefix of snapshot URLs
    #[must_use]
    pub fn archive_web_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.draft.archive_web_prefix = prefix.into();
        self
    }

    /// Minimum spacing between two archive requests
    #[must_use]
    pub fn archive_delay_ms(mut self, ms: u64) -> Self {
        self.draft.archive_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn archive_timeout_ms(mut self, ms: u64) -> Self {
        self.draft.archive_timeout_ms = ms;
        self
    }

    /// Attempts per archive lookup and the linear backoff unit between them
    #[must_use]
    pub fn archive_retry(mut self, max_attempts: u32, base_ms: u64) -> Self {
        self.draft.archive_max_attempts = max_attempts;
        self.draft.archive_retry_base_ms = base_ms;
        self
    }

    #[must_use]
    pub fn archive_timestamp(mut self, timestamp: Option<String>) -> Self {
        self.draft.archive_timestamp = timestamp;
        self
    }

    /// Minimum spacing between two revalidation probes
    #[must_use]
    pub fn revalidate_delay_ms(mut self, ms: u64) -> Self {
        self.draft.revalidate_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn enable_heuristics(mut self, enable: bool) -> Self {
        self.draft.enable_heuristics = enable;
        self
    }

    /// Replace the host rewrite rules
    #[must_use]
    pub fn heuristic_rules(mut self, rules: Vec<HostRule>) -> Self {
        self.draft.heuristic_rules = rules;
        self
    }

    /// Also resolve dead URLs whose failure may be transient or access-related
    #[must_use]
    pub fn resolve_all_dead(mut self, resolve: bool) -> Self {
        self.draft.resolve_all_dead = resolve;
        self
    }

    /// Append a dead-link comment to every line still holding an unresolved URL
    #[must_use]
    pub fn annotate_unresolved(mut self, annotate: bool) -> Self {
        self.draft.annotate_unresolved = annotate;
        self
    }

    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.draft.dry_run = dry_run;
        self
    }
}
