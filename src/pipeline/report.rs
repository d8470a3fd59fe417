//! Report artifacts written by the pipeline
//!
//! - `LivenessReport`: per-URL status, classified failure and occurrences
//! - `ReplacementReport`: substitution history, rollbacks, unresolved URLs
//! - `RunSummary`: counts printed at the end of a command

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{LinkrotError, LinkrotResult};
use crate::link_index::{ExtractionStats, LinkIndex, LinkStatus, Occurrence, UrlRecord};
use crate::link_rewriter::ReplacementAction;
use crate::probe::FailureCategory;
use crate::revalidate::RevalidationEntry;
use crate::scheduler::SchedulerSummary;

/// Write `value` as pretty JSON, creating parent directories
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> LinkrotResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| LinkrotError::io(parent, e))?;
    }
    let body = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, body)
        .await
        .map_err(|e| LinkrotError::io(path, e))
}

/// Counts for the liveness report header
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessSummary {
    pub total: usize,
    pub live: usize,
    pub dead: usize,
    /// Dead URLs per failure category
    pub by_category: BTreeMap<FailureCategory, usize>,
    pub by_status: BTreeMap<LinkStatus, usize>,
}

/// Full per-URL liveness detail
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessReport {
    pub generated_at: DateTime<Utc>,
    pub root: PathBuf,
    pub extraction: ExtractionStats,
    pub summary: LivenessSummary,
    pub results: Vec<UrlRecord>,
    /// URLs that were not live, in index order
    pub broken: Vec<String>,
}

impl LivenessReport {
    #[must_use]
    pub fn from_index(index: &LinkIndex, extraction: &ExtractionStats) -> Self {
        let broken: Vec<String> = index
            .iter()
            .filter(|r| r.category.is_some())
            .map(|r| r.url.clone())
            .collect();

        Self {
            generated_at: Utc::now(),
            root: index.root().to_path_buf(),
            extraction: extraction.clone(),
            summary: LivenessSummary {
                total: index.len(),
                live: index.iter().filter(|r| r.status == LinkStatus::Live).count(),
                dead: broken.len(),
                by_category: index.category_counts(),
                by_status: index.status_counts(),
            },
            results: index.iter().cloned().collect(),
            broken,
        }
    }
}

/// A dead URL nothing could replace
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedEntry {
    pub url: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FailureCategory>,
    pub occurrences: Vec<Occurrence>,
}

/// Unresolved (and never-resolved dead) URLs, most referenced first
#[must_use]
pub fn unresolved_entries(index: &LinkIndex) -> Vec<UnresolvedEntry> {
    let mut entries: Vec<UnresolvedEntry> = index
        .iter()
        .filter(|r| matches!(r.status, LinkStatus::Unresolved | LinkStatus::Dead))
        .map(|r| UnresolvedEntry {
            url: r.url.clone(),
            count: r.occurrences.len(),
            category: r.category,
            occurrences: r.occurrences.clone(),
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.url.cmp(&b.url)));
    entries
}

/// Substitutions made, undone, or impossible
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementReport {
    pub generated_at: DateTime<Utc>,
    pub dry_run: bool,
    /// Full append-only history, earlier runs included
    pub actions: Vec<ReplacementAction>,
    /// Actions a dry run would have taken, never merged into `actions`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub planned: Vec<ReplacementAction>,
    pub revalidation: Vec<RevalidationEntry>,
    pub unresolved: Vec<UnresolvedEntry>,
    /// Old URLs still present after applying
    pub residual: Vec<String>,
    pub errors: Vec<String>,
}

/// Counts from the stages that ran
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveSummary {
    pub candidates: usize,
    pub heuristic: usize,
    pub archived: usize,
    pub unresolved: usize,
    /// Dead URLs left alone because their failure may be transient
    pub ineligible: usize,
}

/// What a command did, for the final console summary
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub extraction: ExtractionStats,
    pub liveness: SchedulerSummary,
    pub categories: BTreeMap<FailureCategory, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ResolveSummary>,
    pub replacements: usize,
    pub confirmed: usize,
    pub reverted: usize,
    pub repaired: usize,
    pub annotated: usize,
    pub errors: usize,
    pub reports: Vec<PathBuf>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Scanned {} files, {} URL occurrences ({} skipped)",
            self.extraction.files_scanned, self.extraction.urls_found, self.extraction.urls_skipped
        )?;
        if self.liveness.checked > 0 {
            writeln!(
                f,
                "Checked {}: {} live, {} dead",
                self.liveness.checked, self.liveness.live, self.liveness.dead
            )?;
            for (category, count) in &self.categories {
                writeln!(f, "  {category}: {count}")?;
            }
        }
        if let Some(resolution) = &self.resolution {
            writeln!(
                f,
                "Resolved {} of {}: {} heuristic, {} archived, {} unresolved, {} not eligible",
                resolution.heuristic + resolution.archived,
                resolution.candidates,
                resolution.heuristic,
                resolution.archived,
                resolution.unresolved,
                resolution.ineligible
            )?;
        }
        if self.replacements + self.repaired + self.confirmed + self.reverted > 0 {
            writeln!(
                f,
                "Rewrote {} files, repaired {}, confirmed {}, reverted {}",
                self.replacements, self.repaired, self.confirmed, self.reverted
            )?;
        }
        if self.annotated > 0 {
            writeln!(f, "Annotated dead links in {} files", self.annotated)?;
        }
        if self.errors > 0 {
            writeln!(f, "{} errors (see report)", self.errors)?;
        }
        for report in &self.reports {
            writeln!(f, "Wrote {}", report.display())?;
        }
        Ok(())
    }
}
