//! Probe outcomes and failure classification.
//!
//! A `ProbeOutcome` is the transient result of one liveness check. It is
//! folded into a `UrlRecord` by the scheduler and never persisted on its own.

use std::error::Error;
use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

/// Classified transport-level failure
///
/// Different kinds carry different signals for a link checker:
/// - `Dns` / `Tls` almost always mean the site is gone or misconfigured
/// - `Timeout` / `Connection` are frequently transient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Attempt exceeded the per-request timeout
    Timeout,
    /// Connection refused / reset / aborted
    Connection,
    /// Host name did not resolve
    Dns,
    /// Certificate or handshake failure
    Tls,
    /// URL could not be parsed or has no host
    InvalidUrl,
    /// Anything else
    Other,
}

impl ErrorKind {
    /// Classify a failure from its full error-chain message
    ///
    /// Order matters: DNS failures surface as connect errors too, so the
    /// more specific patterns are checked first.
    #[must_use]
    pub fn classify_message(message: &str) -> Self {
        let msg = message.to_lowercase();

        if msg.contains("timed out") || msg.contains("timeout") || msg.contains("deadline") {
            return Self::Timeout;
        }

        if msg.contains("dns error")
            || msg.contains("failed to lookup address")
            || msg.contains("name or service not known")
            || msg.contains("nodename nor servname")
            || msg.contains("no such host")
            || msg.contains("enotfound")
        {
            return Self::Dns;
        }

        if msg.contains("certificate")
            || msg.contains("tls")
            || msg.contains("ssl")
            || msg.contains("handshake")
            || msg.contains("invalidcertificate")
        {
            return Self::Tls;
        }

        if msg.contains("connection refused")
            || msg.contains("connection reset")
            || msg.contains("connection aborted")
            || msg.contains("connection closed")
            || msg.contains("econnrefused")
            || msg.contains("econnreset")
            || msg.contains("broken pipe")
            || msg.contains("error trying to connect")
        {
            return Self::Connection;
        }

        if msg.contains("relative url without a base")
            || msg.contains("invalid url")
            || msg.contains("empty host")
            || msg.contains("builder error")
        {
            return Self::InvalidUrl;
        }

        Self::Other
    }

    /// Classify a reqwest error, walking its source chain
    ///
    /// The top-level message embeds the request URL, so only the causes are
    /// matched against. I/O error kinds in the chain win over message text.
    #[must_use]
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::Timeout;
        }
        if error.is_builder() {
            return Self::InvalidUrl;
        }
        if let Some(kind) = Self::from_io_source(error) {
            return kind;
        }

        let kind = error
            .source()
            .map_or(Self::Other, |cause| Self::classify_message(&error_chain_message(cause)));
        if kind == Self::Other && error.is_connect() {
            Self::Connection
        } else {
            kind
        }
    }

    /// First `std::io::Error` in the source chain with a telling kind
    fn from_io_source(error: &(dyn Error + 'static)) -> Option<Self> {
        let mut source = error.source();
        while let Some(cause) = source {
            if let Some(io) = cause.downcast_ref::<io::Error>() {
                match io.kind() {
                    io::ErrorKind::TimedOut => return Some(Self::Timeout),
                    io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::BrokenPipe => return Some(Self::Connection),
                    _ => {}
                }
            }
            source = cause.source();
        }
        None
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Connection => "connection",
            Self::Dns => "dns",
            Self::Tls => "tls",
            Self::InvalidUrl => "invalid-url",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Render an error and all of its sources as one line
pub(crate) fn error_chain_message(error: &(dyn Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Summary bucket for a dead URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureCategory {
    /// HTTP 404
    NotFound,
    /// HTTP 403
    Forbidden,
    /// HTTP 401
    Unauthorized,
    /// HTTP 410
    Gone,
    /// HTTP 429
    TooManyRequests,
    /// HTTP 5xx
    ServerError,
    /// Any other status outside [200, 400)
    OtherStatus,
    Timeout,
    Connection,
    Dns,
    Tls,
    InvalidUrl,
    Other,
}

impl FailureCategory {
    /// Bucket for a final HTTP status outside the live range
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            403 => Self::Forbidden,
            401 => Self::Unauthorized,
            410 => Self::Gone,
            429 => Self::TooManyRequests,
            500..=599 => Self::ServerError,
            _ => Self::OtherStatus,
        }
    }

    /// Bucket for a transport failure
    #[must_use]
    pub fn from_error_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Timeout => Self::Timeout,
            ErrorKind::Connection => Self::Connection,
            ErrorKind::Dns => Self::Dns,
            ErrorKind::Tls => Self::Tls,
            ErrorKind::InvalidUrl => Self::InvalidUrl,
            ErrorKind::Other => Self::Other,
        }
    }

    /// Whether this failure says the resource is really gone
    ///
    /// 401/403/429/5xx and transport hiccups often come from bot protection
    /// or a bad moment; rewriting the source tree on that signal would
    /// replace working links.
    #[must_use]
    pub const fn is_definitive(&self) -> bool {
        matches!(self, Self::NotFound | Self::Gone | Self::Dns | Self::Tls)
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "404 not found",
            Self::Forbidden => "403 forbidden",
            Self::Unauthorized => "401 unauthorized",
            Self::Gone => "410 gone",
            Self::TooManyRequests => "429 too many requests",
            Self::ServerError => "5xx server error",
            Self::OtherStatus => "other status",
            Self::Timeout => "timeout",
            Self::Connection => "connection error",
            Self::Dns => "dns failure",
            Self::Tls => "tls error",
            Self::InvalidUrl => "invalid url",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Result of a single liveness check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    /// Final HTTP status after following redirects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// URL that produced `http_status`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    /// Classified transport failure, when no status was obtained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Human-readable failure detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeOutcome {
    #[must_use]
    pub fn status(status: u16, final_url: impl Into<String>) -> Self {
        Self {
            http_status: Some(status),
            final_url: Some(final_url.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error_kind: Some(kind),
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Live iff a final status was obtained and it lies in [200, 400)
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self.http_status, Some(status) if (200..400).contains(&status))
    }

    /// Failure bucket for a dead outcome, `None` when live
    #[must_use]
    pub fn category(&self) -> Option<FailureCategory> {
        if self.is_live() {
            return None;
        }
        match (self.http_status, self.error_kind) {
            (Some(status), _) => Some(FailureCategory::from_status(status)),
            (None, Some(kind)) => Some(FailureCategory::from_error_kind(kind)),
            (None, None) => Some(FailureCategory::Other),
        }
    }
}
