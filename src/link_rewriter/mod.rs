//! Literal URL substitution across the source tree.
//!
//! This module handles rewriting dead URLs in place:
//! 1. For each `old → new` pair, find the files the old URL was seen in
//! 2. Re-read each file fresh, replace every literal occurrence, write it back
//! 3. Invalidate the cached copy of the file immediately after the write
//!
//! Rewrites substitute whole URLs in the text, not lines, so line drift from
//! earlier rewrites does not matter. Re-running the same pairs is a no-op.

pub mod actions;
pub mod annotate;
pub mod file_cache;

use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;

pub use actions::{ReplacementAction, ReplacementLog, ReplacementNote, ReplacementPair};
pub use annotate::DEAD_LINK_MARKER;
pub use file_cache::FileCache;

use crate::error::{LinkrotError, LinkrotResult};
use crate::link_index::LinkIndex;
use crate::utils::url_spans;

/// Replace every occurrence of the URL `old` with `new`, returning the count
///
/// Only whole URLs match: `old` is found where the extractor would find it,
/// never as the prefix of a longer URL or inside a snapshot URL that wraps
/// it. Applying the same pair twice is therefore a no-op.
#[must_use]
pub fn replace_literal(content: &str, old: &str, new: &str) -> (String, usize) {
    if old.is_empty() || old == new || !content.contains(old) {
        return (content.to_string(), 0);
    }

    let mut out = String::with_capacity(content.len());
    let mut copied = 0;
    let mut count = 0;
    for span in url_spans(content) {
        if &content[span.clone()] != old {
            continue;
        }
        out.push_str(&content[copied..span.start]);
        out.push_str(new);
        copied = span.end;
        count += 1;
    }
    out.push_str(&content[copied..]);
    (out, count)
}

/// 1-based lines of `content` where `replace_literal` would substitute
fn matching_lines(content: &str, old: &str, new: &str) -> Vec<usize> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| line.contains(old) && replace_literal(line, old, new).1 > 0)
        .map(|(i, _)| i + 1)
        .collect()
}

/// Outcome of applying a batch of pairs
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySummary {
    pub actions: Vec<ReplacementAction>,
    /// Per-file failures (non-fatal)
    pub errors: Vec<String>,
}

impl ApplySummary {
    pub fn merge(&mut self, other: ApplySummary) {
        self.actions.extend(other.actions);
        self.errors.extend(other.errors);
    }

    #[must_use]
    pub fn occurrences_replaced(&self) -> usize {
        self.actions.iter().map(|a| a.occurrences_replaced).sum()
    }
}

/// Applies substitution pairs to files on disk
#[derive(Debug)]
pub struct ReplacementApplier {
    root: PathBuf,
    cache: FileCache,
    dry_run: bool,
}

impl ReplacementApplier {
    /// Create an applier
    ///
    /// # Arguments
    /// * `root` - Tree root; action paths are recorded relative to it
    /// * `dry_run` - Compute actions without writing
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            cache: FileCache::default(),
            dry_run,
        }
    }

    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Apply every pair to the files its old URL was indexed in
    pub async fn apply(&mut self, pairs: &[ReplacementPair], index: &LinkIndex) -> ApplySummary {
        let mut summary = ApplySummary::default();
        for pair in pairs {
            let files = index.files_for(&pair.old_url);
            if files.is_empty() {
                debug!("No indexed files for {}", pair.old_url);
                continue;
            }
            summary.merge(self.apply_pair(pair, &files).await);
        }

        info!(
            "Applied {} pairs: {} file rewrites, {} occurrences{}",
            pairs.len(),
            summary.actions.len(),
            summary.occurrences_replaced(),
            if self.dry_run { " (dry run)" } else { "" }
        );
        summary
    }

    /// Apply one pair to the given files
    ///
    /// Each file is read right before it is written. Files that no longer
    /// contain the old URL are skipped without an action.
    pub async fn apply_pair(&mut self, pair: &ReplacementPair, files: &[PathBuf]) -> ApplySummary {
        let mut summary = ApplySummary::default();
        if pair.old_url.is_empty() || pair.old_url == pair.new_url {
            summary
                .errors
                .push(format!("Refusing degenerate replacement {pair:?}"));
            return summary;
        }

        for file in files {
            match self.apply_file(pair, file).await {
                Ok(Some(action)) => summary.actions.push(action),
                Ok(None) => debug!("{} no longer contains {}", file.display(), pair.old_url),
                Err(e) => {
                    warn!("Replacement failed: {e}");
                    summary.errors.push(e.to_string());
                }
            }
        }
        summary
    }

    /// Undo a substitution by applying its inverse
    pub async fn rollback(&mut self, pair: &ReplacementPair, files: &[PathBuf]) -> ApplySummary {
        self.apply_pair(&pair.inverse(), files).await
    }

    /// Old URLs of `pairs` still present in their indexed files
    ///
    /// Reads go through the file cache.
    pub async fn residual(&mut self, pairs: &[ReplacementPair], index: &LinkIndex) -> Vec<String> {
        let mut remaining = Vec::new();
        for pair in pairs {
            for file in index.files_for(&pair.old_url) {
                match self.cache.load(&file).await {
                    Ok(contents) if replace_literal(&contents, &pair.old_url, &pair.new_url).1 > 0 => {
                        remaining.push(pair.old_url.clone());
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Residual check skipped: {e}"),
                }
            }
        }
        remaining
    }

    async fn apply_file(
        &mut self,
        pair: &ReplacementPair,
        path: &Path,
    ) -> LinkrotResult<Option<ReplacementAction>> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LinkrotError::io(path, e))?;

        let (updated, replaced) = replace_literal(&content, &pair.old_url, &pair.new_url);
        if replaced == 0 {
            return Ok(None);
        }
        let lines = matching_lines(&content, &pair.old_url, &pair.new_url);

        if !self.dry_run {
            tokio::fs::write(path, updated)
                .await
                .map_err(|e| LinkrotError::io(path, e))?;
            self.cache.invalidate(path);
        }

        debug!(
            "{}: {} -> {} ({replaced}x)",
            path.display(),
            pair.old_url,
            pair.new_url
        );

        Ok(Some(ReplacementAction {
            file: path.strip_prefix(&self.root).unwrap_or(path).to_path_buf(),
            old_url: pair.old_url.clone(),
            new_url: pair.new_url.clone(),
            applied_at: Utc::now(),
            note: pair.note,
            lines,
            occurrences_replaced: replaced,
            dry_run: self.dry_run,
        }))
    }
}
