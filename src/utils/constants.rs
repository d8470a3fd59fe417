//! Default values and file names shared across the crate

/// Default number of concurrent liveness workers
pub const DEFAULT_CONCURRENCY: usize = 30;

/// Default timeout for a single probe attempt (HEAD or GET): 8 seconds
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 8_000;

/// Default redirect budget for a probe
pub const DEFAULT_MAX_REDIRECTS: u8 = 5;

/// Write a progress checkpoint every N completed probes
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 50;

/// Archive "closest available snapshot" lookup endpoint
pub const DEFAULT_ARCHIVE_ENDPOINT: &str = "https://archive.org/wayback/available";

/// Prefix shared by every archive snapshot URL
///
/// Snapshot URLs have the shape `{prefix}{timestamp}/{original_url}`.
pub const DEFAULT_ARCHIVE_WEB_PREFIX: &str = "https://web.archive.org/web/";

/// Minimum delay between two archive requests: 800ms
pub const DEFAULT_ARCHIVE_DELAY_MS: u64 = 800;

/// Timeout for a single archive lookup request: 15 seconds
pub const DEFAULT_ARCHIVE_TIMEOUT_MS: u64 = 15_000;

/// Maximum attempts for a single archive lookup
pub const DEFAULT_ARCHIVE_MAX_ATTEMPTS: u32 = 3;

/// Linear backoff base for archive retries (attempt × base)
pub const DEFAULT_ARCHIVE_RETRY_BASE_MS: u64 = 2_000;

/// Minimum delay between two revalidation probes of archive snapshots
pub const DEFAULT_REVALIDATE_DELAY_MS: u64 = 500;

/// Maximum characters kept in an occurrence preview
pub const PREVIEW_MAX_CHARS: usize = 200;

/// File extensions scanned by default
pub const DEFAULT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "md", "mdx", "html", "json"];

/// Directory names never descended into
pub const DEFAULT_IGNORED_DIRS: &[&str] = &["node_modules", ".git", ".next", "target", "dist", "build"];

/// URLs containing any of these substrings are not recorded
pub const DEFAULT_SKIP_PATTERNS: &[&str] = &["localhost", "127.0.0.1", "${"];

/// Report directory created under the scanned root when none is configured
pub const DEFAULT_REPORT_DIR_NAME: &str = ".linkrot";

/// Liveness report file name
pub const LIVENESS_REPORT_FILE: &str = "link-check-results.json";

/// Progress checkpoint file name
pub const PROGRESS_FILE: &str = "link-check-progress.json";

/// Replacement report file name
pub const REPLACEMENT_REPORT_FILE: &str = "link-replacement-report.json";

/// Chrome user agent string sent with every probe
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
