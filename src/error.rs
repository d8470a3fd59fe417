//! Error types for the link pipeline
//!
//! Per-URL and per-file failures never escape the pipeline's outer loop: they
//! are folded into probe outcomes and report entries. `LinkrotError` covers
//! the failures that do travel through `Result`s: archive lookups, report
//! persistence, configuration and illegal status transitions.

use std::path::PathBuf;

use thiserror::Error;

use crate::link_index::LinkStatus;

/// Result type alias for link pipeline operations
pub type LinkrotResult<T> = Result<T, LinkrotError>;

/// Error types for link pipeline operations
#[derive(Debug, Error)]
pub enum LinkrotError {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system error with the offending path
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP client / transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Collaborator answered with a body we could not parse
    #[error("Malformed archive response: {0}")]
    MalformedResponse(String),

    /// Collaborator answered with a non-success status
    #[error("Archive lookup failed with HTTP status {0}")]
    ArchiveStatus(u16),

    /// A record was asked to move along an edge the lifecycle does not have
    #[error("Invalid status transition for {url}: {from} -> {to}")]
    InvalidTransition {
        url: String,
        from: LinkStatus,
        to: LinkStatus,
    },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for LinkrotError {
    fn from(error: anyhow::Error) -> Self {
        LinkrotError::Other(format!("{error:#}"))
    }
}

impl LinkrotError {
    /// Build an I/O error carrying the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LinkrotError::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if error is transient and the request should be retried
    ///
    /// Transport failures, malformed bodies and throttling / server-side
    /// statuses are transient. A 4xx other than 429 is an answer, not a
    /// hiccup.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            LinkrotError::Http(_) | LinkrotError::MalformedResponse(_) => true,
            LinkrotError::ArchiveStatus(status) => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(LinkrotError::MalformedResponse("eof".into()).is_transient());
        assert!(LinkrotError::ArchiveStatus(503).is_transient());
        assert!(LinkrotError::ArchiveStatus(429).is_transient());
        assert!(!LinkrotError::ArchiveStatus(400).is_transient());
        assert!(!LinkrotError::Config("bad".into()).is_transient());
    }

    #[test]
    fn io_error_mentions_path() {
        let err = LinkrotError::io(
            "/tmp/missing.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/missing.txt"));
    }
}
