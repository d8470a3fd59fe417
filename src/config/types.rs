//! Core configuration type for link checking
//!
//! `LinkCheckConfig` holds every tunable of the pipeline. It deserializes
//! from a JSON file where every field is optional, and is otherwise built
//! through `LinkCheckConfig::builder()`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::heuristics::HostRule;
use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_ARCHIVE_DELAY_MS, DEFAULT_ARCHIVE_ENDPOINT,
    DEFAULT_ARCHIVE_MAX_ATTEMPTS, DEFAULT_ARCHIVE_RETRY_BASE_MS, DEFAULT_ARCHIVE_TIMEOUT_MS,
    DEFAULT_ARCHIVE_WEB_PREFIX, DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_CONCURRENCY,
    DEFAULT_EXTENSIONS, DEFAULT_IGNORED_DIRS, DEFAULT_MAX_REDIRECTS, DEFAULT_PROBE_TIMEOUT_MS,
    DEFAULT_REVALIDATE_DELAY_MS, DEFAULT_SKIP_PATTERNS,
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// Configuration for a link check / repair run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkCheckConfig {
    /// Tree to scan and rewrite.
    ///
    /// **INVARIANT:** absolute once built or loaded.
    pub(crate) root_dir: PathBuf,
    /// Where reports and the checkpoint go; `<root>/.linkrot` when unset
    pub(crate) report_dir: Option<PathBuf>,

    pub(crate) extensions: Vec<String>,
    pub(crate) ignored_dirs: Vec<String>,
    /// URLs containing any of these substrings are not recorded
    pub(crate) skip_patterns: Vec<String>,

    pub(crate) concurrency: usize,
    pub(crate) probe_timeout_ms: u64,
    pub(crate) max_redirects: u8,
    pub(crate) checkpoint_interval: usize,
    pub(crate) user_agent: String,

    pub(crate) archive_endpoint: String,
    /// Prefix of snapshot URLs, `{prefix}{timestamp}/{url}`
    pub(crate) archive_web_prefix: String,
    pub(crate) archive_delay_ms: u64,
    pub(crate) archive_timeout_ms: u64,
    pub(crate) archive_max_attempts: u32,
    pub(crate) archive_retry_base_ms: u64,
    /// Preferred capture time, forwarded as the lookup's `timestamp`
    pub(crate) archive_timestamp: Option<String>,

    pub(crate) revalidate_delay_ms: u64,

    pub(crate) enable_heuristics: bool,
    pub(crate) heuristic_rules: Vec<HostRule>,
    /// Resolve every dead URL, not only 404/410/DNS/TLS failures
    pub(crate) resolve_all_dead: bool,
    /// Mark the lines of unresolved dead URLs with a comment
    pub(crate) annotate_unresolved: bool,
    /// Compute replacements without writing files
    pub(crate) dry_run: bool,
}

impl Default for LinkCheckConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            report_dir: None,
            extensions: strings(DEFAULT_EXTENSIONS),
            ignored_dirs: strings(DEFAULT_IGNORED_DIRS),
            skip_patterns: strings(DEFAULT_SKIP_PATTERNS),
            concurrency: DEFAULT_CONCURRENCY,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            user_agent: CHROME_USER_AGENT.to_string(),
            archive_endpoint: DEFAULT_ARCHIVE_ENDPOINT.to_string(),
            archive_web_prefix: DEFAULT_ARCHIVE_WEB_PREFIX.to_string(),
            archive_delay_ms: DEFAULT_ARCHIVE_DELAY_MS,
            archive_timeout_ms: DEFAULT_ARCHIVE_TIMEOUT_MS,
            archive_max_attempts: DEFAULT_ARCHIVE_MAX_ATTEMPTS,
            archive_retry_base_ms: DEFAULT_ARCHIVE_RETRY_BASE_MS,
            archive_timestamp: None,
            revalidate_delay_ms: DEFAULT_REVALIDATE_DELAY_MS,
            enable_heuristics: true,
            heuristic_rules: HostRule::defaults(),
            resolve_all_dead: false,
            annotate_unresolved: false,
            dry_run: false,
        }
    }
}
