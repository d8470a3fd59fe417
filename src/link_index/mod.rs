//! In-memory index of every external URL referenced by a source tree.
//!
//! This module tracks:
//! - One `UrlRecord` per distinct literal URL (insertion-ordered)
//! - Every place the URL appears (`Occurrence`: file, line, preview)
//! - The record's lifecycle status and last probe result
//!
//! This enables queries like:
//! - "Which files mention this URL?" (for replacement)
//! - "Which URLs are dead and still need a replacement?"

pub mod extractor;
pub mod status;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{LinkrotError, LinkrotResult};
use crate::probe::{ErrorKind, FailureCategory, ProbeOutcome};

pub use extractor::{ExtractionStats, UrlExtractor};
pub use status::LinkStatus;

/// One textual appearance of a URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Path relative to the scanned root
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Trimmed source line, diagnostic only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Everything known about one distinct URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecord {
    pub url: String,
    pub status: LinkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_http_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FailureCategory>,
    pub occurrences: Vec<Occurrence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_replacement: Option<String>,
}

impl UrlRecord {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: LinkStatus::Unknown,
            last_http_code: None,
            last_error: None,
            category: None,
            occurrences: Vec::new(),
            resolved_replacement: None,
        }
    }

    /// Move the record along a lifecycle edge
    ///
    /// # Errors
    ///
    /// Returns `LinkrotError::InvalidTransition` if the lifecycle has no edge
    /// from the current status to `next`. The record is left unchanged.
    pub fn transition(&mut self, next: LinkStatus) -> LinkrotResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(LinkrotError::InvalidTransition {
                url: self.url.clone(),
                from: self.status,
                to: next,
            });
        }
        debug!("{}: {} -> {}", self.url, self.status, next);
        self.status = next;
        Ok(())
    }

    /// Fold a probe outcome into the record (`unknown` → `live` | `dead`)
    pub fn apply_probe(&mut self, outcome: &ProbeOutcome) -> LinkrotResult<()> {
        let next = if outcome.is_live() {
            LinkStatus::Live
        } else {
            LinkStatus::Dead
        };
        self.transition(next)?;
        self.last_http_code = outcome.http_status;
        self.last_error = outcome.error_kind;
        self.category = outcome.category();
        Ok(())
    }

    /// Record a replacement found by a resolver stage
    pub fn resolve(&mut self, status: LinkStatus, replacement: impl Into<String>) -> LinkrotResult<()> {
        self.transition(status)?;
        self.resolved_replacement = Some(replacement.into());
        Ok(())
    }

    /// Files the URL appears in, relative to the root, first-seen order
    #[must_use]
    pub fn files(&self) -> Vec<&Path> {
        let mut seen = HashSet::new();
        self.occurrences
            .iter()
            .map(|occ| occ.file.as_path())
            .filter(|file| seen.insert(*file))
            .collect()
    }

    /// Whether this dead record should be sent to the resolver stages
    #[must_use]
    pub fn is_resolution_candidate(&self, resolve_all_dead: bool) -> bool {
        self.status == LinkStatus::Dead
            && (resolve_all_dead || self.category.is_some_and(|c| c.is_definitive()))
    }
}

/// Insertion-ordered map from literal URL to its record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkIndex {
    root: PathBuf,
    records: Vec<UrlRecord>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl LinkIndex {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            records: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Root directory occurrence paths are relative to
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Append an occurrence, creating the record on first sight
    ///
    /// The URL is used verbatim: callers normalize once, before recording.
    pub fn record_occurrence(&mut self, url: &str, occurrence: Occurrence) {
        let position = match self.positions.get(url) {
            Some(&position) => position,
            None => {
                self.records.push(UrlRecord::new(url));
                let position = self.records.len() - 1;
                self.positions.insert(url.to_string(), position);
                position
            }
        };
        self.records[position].occurrences.push(occurrence);
    }

    #[must_use]
    pub fn get(&self, url: &str) -> Option<&UrlRecord> {
        self.positions.get(url).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, url: &str) -> Option<&mut UrlRecord> {
        self.positions.get(url).map(|&i| &mut self.records[i])
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.positions.contains_key(url)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UrlRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut UrlRecord> {
        self.records.iter_mut()
    }

    /// URLs currently in `status`, insertion order
    #[must_use]
    pub fn urls_with_status(&self, status: LinkStatus) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.status == status)
            .map(|r| r.url.clone())
            .collect()
    }

    /// Absolute paths of the files a URL appears in
    #[must_use]
    pub fn files_for(&self, url: &str) -> Vec<PathBuf> {
        self.get(url)
            .map(|record| {
                record
                    .files()
                    .into_iter()
                    .map(|file| self.root.join(file))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Record count per status
    #[must_use]
    pub fn status_counts(&self) -> BTreeMap<LinkStatus, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.status).or_insert(0) += 1;
        }
        counts
    }

    /// Dead-record count per failure category
    #[must_use]
    pub fn category_counts(&self) -> BTreeMap<FailureCategory, usize> {
        let mut counts = BTreeMap::new();
        for category in self.records.iter().filter_map(|r| r.category) {
            *counts.entry(category).or_insert(0) += 1;
        }
        counts
    }
}
