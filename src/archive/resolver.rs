//! Archive "closest available snapshot" lookups
//!
//! Requests are strictly serialized through a `RequestGate` and retried with
//! linear backoff on transport failures, throttling statuses and unparseable
//! bodies. A well-formed answer without a snapshot is final.

use std::time::Duration;

use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::config::LinkCheckConfig;
use crate::error::{LinkrotError, LinkrotResult};
use crate::throttle::{RequestGate, RetryPolicy, retry_with_backoff};
use crate::utils::upgrade_to_https;

#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    #[serde(default)]
    archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Default, Deserialize)]
struct ArchivedSnapshots {
    closest: Option<ClosestSnapshot>,
}

#[derive(Debug, Deserialize)]
struct ClosestSnapshot {
    #[serde(default)]
    available: bool,
    url: Option<String>,
    timestamp: Option<String>,
}

impl AvailabilityResponse {
    fn snapshot_url(self) -> Option<(String, Option<String>)> {
        let closest = self.archived_snapshots.closest?;
        if !closest.available {
            return None;
        }
        closest
            .url
            .filter(|url| !url.is_empty())
            .map(|url| (url, closest.timestamp))
    }
}

/// Looks up historical snapshots for dead URLs
#[derive(Debug)]
pub struct ArchiveResolver {
    client: Client,
    endpoint: String,
    timestamp: Option<String>,
    gate: RequestGate,
    retry: RetryPolicy,
}

impl ArchiveResolver {
    /// Create a resolver
    ///
    /// # Arguments
    /// * `endpoint` - Lookup endpoint taking `url` and `timestamp` query parameters
    /// * `timeout` - Per-request timeout
    /// * `delay` - Minimum spacing between two requests
    /// * `retry` - Attempts and backoff base for transient failures
    /// * `user_agent` - User-Agent header
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        delay: Duration,
        retry: RetryPolicy,
        user_agent: &str,
    ) -> LinkrotResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timestamp: None,
            gate: RequestGate::new(delay),
            retry,
        })
    }

    pub fn from_config(config: &LinkCheckConfig) -> LinkrotResult<Self> {
        let resolver = Self::new(
            config.archive_endpoint(),
            config.archive_timeout(),
            config.archive_delay(),
            config.archive_retry_policy(),
            config.user_agent(),
        )?;
        Ok(resolver.with_timestamp(config.archive_timestamp().map(str::to_string)))
    }

    /// Ask for the capture closest to this timestamp (`YYYYMMDDhhmmss` prefix)
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Option<String>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Snapshot URL for `url`, `Ok(None)` if the archive has none
    ///
    /// # Errors
    ///
    /// Returns the last error once every attempt failed, or the first
    /// non-transient error.
    pub async fn lookup(&self, url: &str) -> LinkrotResult<Option<String>> {
        retry_with_backoff(self.retry, || self.lookup_once(url)).await
    }

    /// Like `lookup`, with failures logged and reported as "no snapshot"
    pub async fn resolve(&self, url: &str) -> Option<String> {
        match self.lookup(url).await {
            Ok(Some(snapshot)) => {
                debug!("Archived: {url} -> {snapshot}");
                Some(snapshot)
            }
            Ok(None) => {
                debug!("No archive for {url}");
                None
            }
            Err(e) => {
                warn!("Archive lookup failed for {url}: {e}");
                None
            }
        }
    }

    /// Resolve a batch sequentially, in input order
    pub async fn resolve_all(&self, urls: &[String]) -> Vec<(String, Option<String>)> {
        let mut resolved = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            let snapshot = self.resolve(url).await;
            resolved.push((url.clone(), snapshot));
            if (i + 1) % 10 == 0 {
                info!("Archive lookups: {}/{}", i + 1, urls.len());
            }
        }
        resolved
    }

    async fn lookup_once(&self, url: &str) -> LinkrotResult<Option<String>> {
        let _permit = self.gate.acquire().await;

        let mut query = vec![("url", url)];
        if let Some(timestamp) = &self.timestamp {
            query.push(("timestamp", timestamp.as_str()));
        }

        let response = self.client.get(self.endpoint.as_str()).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LinkrotError::ArchiveStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        let parsed: AvailabilityResponse = serde_json::from_slice(&body)
            .map_err(|e| LinkrotError::MalformedResponse(e.to_string()))?;

        Ok(parsed.snapshot_url().map(|(snapshot, timestamp)| {
            if let Some(timestamp) = timestamp {
                debug!("Closest capture of {url} is from {timestamp}");
            }
            upgrade_to_https(&snapshot)
        }))
    }
}
