//! Archive snapshot URL handling
//!
//! Snapshot URLs look like `{prefix}{timestamp}/{original_url}`, where the
//! prefix is e.g. `https://web.archive.org/web/` and the timestamp is a run of
//! digits (`20200101`, `20241225000000`) or `*` for the browse page that lists
//! every capture.

use crate::utils::upgrade_to_https;

/// Timestamp segment of the generic browse page
pub const WILDCARD_TIMESTAMP: &str = "*";

/// A parsed snapshot URL, borrowing from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot<'a> {
    pub timestamp: &'a str,
    pub original: &'a str,
}

impl Snapshot<'_> {
    /// The generic "all captures" page rather than one capture
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.timestamp == WILDCARD_TIMESTAMP
    }
}

/// Recognizes and builds snapshot URLs under one prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotUrls {
    prefix: String,
    // same prefix with the other scheme
    alternate: Option<String>,
}

impl SnapshotUrls {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        let alternate = if let Some(rest) = prefix.strip_prefix("https://") {
            Some(format!("http://{rest}"))
        } else {
            prefix.strip_prefix("http://").map(|rest| format!("https://{rest}"))
        };
        Self { prefix, alternate }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Split a snapshot URL into timestamp and original URL
    #[must_use]
    pub fn parse<'a>(&self, url: &'a str) -> Option<Snapshot<'a>> {
        let rest = url.strip_prefix(self.prefix.as_str()).or_else(|| {
            self.alternate
                .as_deref()
                .and_then(|alternate| url.strip_prefix(alternate))
        })?;
        let (timestamp, original) = rest.split_once('/')?;
        let valid_timestamp = timestamp == WILDCARD_TIMESTAMP
            || timestamp.starts_with(|c: char| c.is_ascii_digit());
        (valid_timestamp && !original.is_empty()).then_some(Snapshot {
            timestamp,
            original,
        })
    }

    #[must_use]
    pub fn is_snapshot(&self, url: &str) -> bool {
        self.parse(url).is_some()
    }

    #[must_use]
    pub fn is_wildcard(&self, url: &str) -> bool {
        self.parse(url).is_some_and(|snapshot| snapshot.is_wildcard())
    }

    /// Browse-page URL listing every capture of `original`
    #[must_use]
    pub fn wildcard(&self, original: &str) -> String {
        format!("{}{WILDCARD_TIMESTAMP}/{original}", self.prefix)
    }

    /// Original URL behind a snapshot, unwrapping any nesting
    #[must_use]
    pub fn original_of<'a>(&self, url: &'a str) -> Option<&'a str> {
        let mut original = self.parse(url)?.original;
        while let Some(inner) = self.parse(original) {
            original = inner.original;
        }
        Some(original)
    }

    /// Collapse a snapshot that wraps another snapshot to the innermost one
    ///
    /// `{prefix}2024/{prefix}20241225000000/x` becomes
    /// `{prefix}20241225000000/x`, with an `http:` inner snapshot upgraded.
    /// Returns `None` when `url` is not nested.
    #[must_use]
    pub fn collapse_nested(&self, url: &str) -> Option<String> {
        let mut inner = self.parse(url)?.original;
        if !self.is_snapshot(inner) {
            return None;
        }
        while let Some(snapshot) = self.parse(inner) {
            if !self.is_snapshot(snapshot.original) {
                break;
            }
            inner = snapshot.original;
        }
        Some(upgrade_to_https(inner))
    }
}
