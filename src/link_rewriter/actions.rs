//! Replacement history
//!
//! Every committed substitution becomes one `ReplacementAction`. Actions are
//! never edited: a rollback is recorded as a new action with the URLs swapped.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LinkrotError, LinkrotResult};

/// Why a substitution was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplacementNote {
    /// Live variant found by the heuristic resolver
    Heuristic,
    /// Archive snapshot
    Archive,
    /// Inverse of an earlier substitution
    Rollback,
    /// Snapshot wrapping another snapshot collapsed to the inner one
    NestedArchiveRepair,
    /// Comment marking a dead URL left in place; `old_url == new_url`
    DeadLinkAnnotation,
}

impl ReplacementNote {
    /// Whether the action swapped one URL for another going forward
    #[must_use]
    pub const fn is_forward_substitution(self) -> bool {
        matches!(self, Self::Heuristic | Self::Archive | Self::NestedArchiveRepair)
    }
}

/// One `old → new` substitution to perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementPair {
    pub old_url: String,
    pub new_url: String,
    pub note: ReplacementNote,
}

impl ReplacementPair {
    #[must_use]
    pub fn new(old_url: impl Into<String>, new_url: impl Into<String>, note: ReplacementNote) -> Self {
        Self {
            old_url: old_url.into(),
            new_url: new_url.into(),
            note,
        }
    }

    /// The substitution that undoes this one
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self::new(&self.new_url, &self.old_url, ReplacementNote::Rollback)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A committed substitution in one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementAction {
    pub file: PathBuf,
    pub old_url: String,
    pub new_url: String,
    pub applied_at: DateTime<Utc>,
    pub note: ReplacementNote,
    /// 1-based lines that held the old URL
    pub lines: Vec<usize>,
    pub occurrences_replaced: usize,
    /// Computed but not written
    #[serde(default, skip_serializing_if = "is_false")]
    pub dry_run: bool,
}

/// Append-only log of replacement actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplacementLog {
    actions: Vec<ReplacementAction>,
}

#[derive(Deserialize)]
struct ReportActions {
    #[serde(default)]
    actions: ReplacementLog,
}

impl ReplacementLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: ReplacementAction) {
        self.actions.push(action);
    }

    pub fn extend(&mut self, actions: impl IntoIterator<Item = ReplacementAction>) {
        self.actions.extend(actions);
    }

    #[must_use]
    pub fn actions(&self) -> &[ReplacementAction] {
        &self.actions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// URL that `new_url` replaced, from the most recent forward action
    #[must_use]
    pub fn original_for(&self, new_url: &str) -> Option<&str> {
        self.actions
            .iter()
            .rev()
            .filter(|a| a.note.is_forward_substitution() && !a.dry_run)
            .find(|a| a.new_url == new_url)
            .map(|a| a.old_url.as_str())
    }

    /// Rollback actions, in the order they were recorded
    pub fn rollbacks(&self) -> impl Iterator<Item = &ReplacementAction> {
        self.actions
            .iter()
            .filter(|a| a.note == ReplacementNote::Rollback)
    }

    /// Load the `actions` array of a previously written replacement report
    ///
    /// A missing report is an empty log.
    pub async fn load_from_report(path: &Path) -> LinkrotResult<Self> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice::<ReportActions>(&bytes)?.actions),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(LinkrotError::io(path, e)),
        }
    }
}
