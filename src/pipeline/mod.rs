//! End-to-end control flow
//!
//! ```text
//! extract ──▶ probe (worker pool) ──▶ resolve (heuristics, archive) ──▶ apply ──▶ revalidate
//! ```
//!
//! Every stage runs to completion before the next starts. Only the applier
//! and the rollback pass write to the tree, and they run sequentially.

pub mod report;

use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};

pub use report::{
    LivenessReport, LivenessSummary, ReplacementReport, ResolveSummary, RunSummary,
    UnresolvedEntry, unresolved_entries, write_json,
};

use crate::archive::ArchiveResolver;
use crate::config::LinkCheckConfig;
use crate::error::{LinkrotError, LinkrotResult};
use crate::heuristics::{CandidateKind, HeuristicResolver};
use crate::link_index::{ExtractionStats, LinkIndex, LinkStatus, UrlExtractor};
use crate::link_rewriter::{
    ApplySummary, ReplacementAction, ReplacementApplier, ReplacementLog, ReplacementNote,
    ReplacementPair,
};
use crate::probe::{HttpProber, LivenessProbe};
use crate::revalidate::{RevalidationRun, Revalidator, Verdict};
use crate::scheduler::{
    Checkpoint, CheckpointWriter, LivenessScheduler, LogProgress, SchedulerSummary,
};

/// Owns the configuration and the network collaborators for one run
pub struct LinkPipeline<P = HttpProber> {
    config: LinkCheckConfig,
    probe: Arc<P>,
    archive: ArchiveResolver,
}

impl LinkPipeline<HttpProber> {
    /// Build the HTTP prober and archive client from `config`
    pub fn new(config: LinkCheckConfig) -> LinkrotResult<Self> {
        let probe = HttpProber::from_config(&config)?;
        let archive = ArchiveResolver::from_config(&config)?;
        Ok(Self::with_components(config, probe, archive))
    }
}

impl<P: LivenessProbe + 'static> LinkPipeline<P> {
    #[must_use]
    pub fn with_components(config: LinkCheckConfig, probe: P, archive: ArchiveResolver) -> Self {
        Self {
            config,
            probe: Arc::new(probe),
            archive,
        }
    }

    #[must_use]
    pub fn config(&self) -> &LinkCheckConfig {
        &self.config
    }

    /// Walk the tree on the blocking pool and index every URL
    pub async fn extract(&self) -> LinkrotResult<(LinkIndex, ExtractionStats)> {
        let extractor = UrlExtractor::from_config(&self.config);
        let root = self.config.root_dir().to_path_buf();
        tokio::task::spawn_blocking(move || extractor.extract(&root))
            .await
            .map_err(|e| LinkrotError::Other(format!("Extraction task failed: {e}")))
    }

    /// Probe every unprobed record, checkpointing as it goes
    pub async fn probe_all(&self, index: &mut LinkIndex) -> SchedulerSummary {
        let interval = self.config.checkpoint_interval();
        LivenessScheduler::new(Arc::clone(&self.probe), self.config.concurrency())
            .with_checkpoint(CheckpointWriter::new(self.config.progress_path(), interval))
            .with_progress(LogProgress::new(interval))
            .run(index)
            .await
    }

    /// Find a replacement for every eligible dead record
    ///
    /// Heuristic variants are tried first. A live wildcard browse page is not
    /// accepted as a replacement: the archive is asked for a real capture
    /// instead. Dead archive URLs are never resolved, which would nest one
    /// snapshot inside another.
    pub async fn resolve(&self, index: &mut LinkIndex) -> ResolveSummary {
        let resolve_all_dead = self.config.resolve_all_dead();
        let snapshots = self.config.snapshot_urls();
        let mut summary = ResolveSummary::default();

        let candidates: Vec<String> = index
            .iter()
            .filter(|r| r.status == LinkStatus::Dead)
            .filter_map(|r| {
                if r.is_resolution_candidate(resolve_all_dead) {
                    Some(r.url.clone())
                } else {
                    summary.ineligible += 1;
                    None
                }
            })
            .collect();
        summary.candidates = candidates.len();

        let heuristics = self.config.enable_heuristics().then(|| {
            HeuristicResolver::new(
                Arc::clone(&self.probe),
                self.config.heuristic_rules().to_vec(),
                snapshots.clone(),
            )
        });

        for url in candidates {
            let replacement = if snapshots.is_snapshot(&url) {
                debug!("Not resolving dead archive URL {url}");
                None
            } else {
                self.find_replacement(&url, heuristics.as_ref()).await
            };

            let Some(record) = index.get_mut(&url) else {
                continue;
            };
            let result = match replacement {
                Some((status, new_url)) => {
                    if status == LinkStatus::HeuristicResolved {
                        summary.heuristic += 1;
                    } else {
                        summary.archived += 1;
                    }
                    record.resolve(status, new_url)
                }
                None => {
                    summary.unresolved += 1;
                    record.transition(LinkStatus::Unresolved)
                }
            };
            if let Err(e) = result {
                warn!("{e}");
            }
        }

        info!(
            "Resolution: {} heuristic, {} archived, {} unresolved, {} not eligible",
            summary.heuristic, summary.archived, summary.unresolved, summary.ineligible
        );
        summary
    }

    async fn find_replacement(
        &self,
        url: &str,
        heuristics: Option<&HeuristicResolver<Arc<P>>>,
    ) -> Option<(LinkStatus, String)> {
        if let Some(heuristics) = heuristics {
            match heuristics.find_live(url).await {
                Some(candidate) if candidate.kind != CandidateKind::ArchiveWildcard => {
                    return Some((LinkStatus::HeuristicResolved, candidate.url));
                }
                Some(_) => debug!("Only the archive browse page answers for {url}"),
                None => {}
            }
        }
        self.archive
            .resolve(url)
            .await
            .map(|snapshot| (LinkStatus::Archived, snapshot))
    }

    /// `old → new` pairs for every record holding an unwritten replacement
    #[must_use]
    pub fn replacement_pairs(index: &LinkIndex) -> Vec<ReplacementPair> {
        index
            .iter()
            .filter(|r| r.status.has_pending_replacement())
            .filter_map(|r| {
                let new_url = r.resolved_replacement.as_ref()?;
                let note = if r.status == LinkStatus::HeuristicResolved {
                    ReplacementNote::Heuristic
                } else {
                    ReplacementNote::Archive
                };
                Some(ReplacementPair::new(&r.url, new_url, note))
            })
            .collect()
    }

    /// Write pending replacements and mark the rewritten records `applied`
    ///
    /// Returns the applier's summary and the old URLs still in the tree.
    pub async fn apply(
        &self,
        index: &mut LinkIndex,
        applier: &mut ReplacementApplier,
    ) -> (ApplySummary, Vec<String>) {
        let pairs = Self::replacement_pairs(index);
        if pairs.is_empty() {
            return (ApplySummary::default(), Vec::new());
        }

        let summary = applier.apply(&pairs, index).await;
        if applier.is_dry_run() {
            return (summary, Vec::new());
        }

        for pair in &pairs {
            if summary.actions.iter().any(|a| a.old_url == pair.old_url)
                && let Some(record) = index.get_mut(&pair.old_url)
                && let Err(e) = record.transition(LinkStatus::Applied)
            {
                warn!("{e}");
            }
        }

        let residual = applier.residual(&pairs, index).await;
        if !residual.is_empty() {
            warn!("{} replaced URLs are still present in the tree", residual.len());
        }
        (summary, residual)
    }

    fn revalidator(&self) -> Revalidator<Arc<P>> {
        Revalidator::new(
            Arc::clone(&self.probe),
            self.config.snapshot_urls(),
            self.config.revalidate_delay(),
        )
    }

    /// Re-probe the archive URLs currently in the tree
    ///
    /// The tree is re-extracted first: earlier stages may have rewritten it.
    pub async fn revalidate_tree(
        &self,
        log: &ReplacementLog,
        applier: &mut ReplacementApplier,
    ) -> LinkrotResult<RevalidationRun> {
        let (fresh, _) = self.extract().await?;
        Ok(self.revalidator().run(&fresh, log, applier).await)
    }

    /// Fold revalidation verdicts into the `applied` records they concern
    pub fn fold_verdicts(index: &mut LinkIndex, run: &RevalidationRun) {
        for entry in &run.entries {
            let next = match entry.verdict {
                Verdict::Confirmed => LinkStatus::Confirmed,
                Verdict::Reverted => LinkStatus::Reverted,
                Verdict::Inconclusive => continue,
            };
            if let Some(record) = index.get_mut(&entry.original_url)
                && record.status == LinkStatus::Applied
                && let Err(e) = record.transition(next)
            {
                warn!("{e}");
            }
        }
    }

    /// Comment the lines of dead URLs left without a working replacement
    ///
    /// Covers `unresolved` records and `reverted` ones whose snapshot died.
    /// Does nothing unless `annotate_unresolved` is set.
    pub async fn annotate_unresolved(
        &self,
        index: &LinkIndex,
        applier: &mut ReplacementApplier,
    ) -> ApplySummary {
        if !self.config.annotate_unresolved() {
            return ApplySummary::default();
        }
        let mut urls = index.urls_with_status(LinkStatus::Unresolved);
        urls.extend(index.urls_with_status(LinkStatus::Reverted));
        applier.annotate(&urls, index).await
    }

    /// Confirm rewritten heuristic variants, returning how many moved
    ///
    /// `find_live` already saw these variants answer, and revalidation only
    /// re-probes archive URLs, so their `applied` records are settled here.
    pub fn confirm_heuristics(index: &mut LinkIndex, urls: &[String]) -> usize {
        let mut confirmed = 0;
        for url in urls {
            if let Some(record) = index.get_mut(url)
                && record.status == LinkStatus::Applied
            {
                match record.transition(LinkStatus::Confirmed) {
                    Ok(()) => confirmed += 1,
                    Err(e) => warn!("{e}"),
                }
            }
        }
        confirmed
    }

    /// Extract and probe; writes the liveness report
    pub async fn check(&self) -> LinkrotResult<RunSummary> {
        let (index, mut summary) = self.checked_index().await?;
        self.write_liveness_report(&index, &mut summary).await?;
        Ok(summary)
    }

    /// Extract, probe and resolve; reports planned rewrites without writing
    pub async fn resolve_only(&self) -> LinkrotResult<RunSummary> {
        let (mut index, mut summary) = self.checked_index().await?;
        summary.resolution = Some(self.resolve(&mut index).await);

        let mut applier = ReplacementApplier::new(index.root(), true);
        let (mut planned, _) = self.apply(&mut index, &mut applier).await;
        summary.replacements = planned.actions.len();
        let annotated = self.annotate_unresolved(&index, &mut applier).await;
        summary.annotated = annotated.actions.len();
        planned.merge(annotated);
        summary.errors = planned.errors.len();

        let log = ReplacementLog::load_from_report(&self.config.replacement_report_path()).await?;
        let report = ReplacementReport {
            generated_at: chrono::Utc::now(),
            dry_run: true,
            actions: log.actions().to_vec(),
            planned: planned.actions,
            unresolved: unresolved_entries(&index),
            errors: planned.errors,
            ..Default::default()
        };

        self.write_liveness_report(&index, &mut summary).await?;
        self.write_replacement_report(&report, &mut summary).await?;
        Ok(summary)
    }

    /// Extract, probe, resolve, apply, then revalidate what was applied
    pub async fn fix(&self) -> LinkrotResult<RunSummary> {
        let dry_run = self.config.dry_run();
        let (mut index, mut summary) = self.checked_index().await?;
        summary.resolution = Some(self.resolve(&mut index).await);

        let mut log = ReplacementLog::load_from_report(&self.config.replacement_report_path()).await?;
        let heuristic = index.urls_with_status(LinkStatus::HeuristicResolved);
        let mut applier = ReplacementApplier::new(index.root(), dry_run);
        let (applied, residual) = self.apply(&mut index, &mut applier).await;
        summary.replacements = applied.actions.len();

        let mut errors = applied.errors;
        let mut planned = Vec::new();
        record_actions(&mut log, &mut planned, applied.actions, dry_run);

        let mut revalidation = Vec::new();
        if !dry_run && summary.replacements > 0 {
            let run = self.revalidate_tree(&log, &mut applier).await?;
            Self::fold_verdicts(&mut index, &run);
            summary.confirmed = run.count(Verdict::Confirmed);
            summary.reverted = run.count(Verdict::Reverted);
            errors.extend(run.rollbacks.errors);
            record_actions(&mut log, &mut planned, run.rollbacks.actions, dry_run);
            revalidation = run.entries;
        }
        if !dry_run {
            summary.confirmed += Self::confirm_heuristics(&mut index, &heuristic);
        }

        let annotated = self.annotate_unresolved(&index, &mut applier).await;
        summary.annotated = annotated.actions.len();
        errors.extend(annotated.errors);
        record_actions(&mut log, &mut planned, annotated.actions, dry_run);
        summary.errors = errors.len();

        let report = ReplacementReport {
            generated_at: chrono::Utc::now(),
            dry_run,
            actions: log.actions().to_vec(),
            planned,
            revalidation,
            unresolved: unresolved_entries(&index),
            residual,
            errors,
        };

        self.write_liveness_report(&index, &mut summary).await?;
        self.write_replacement_report(&report, &mut summary).await?;
        Ok(summary)
    }

    /// Repair nested snapshots, then re-probe every archive URL in the tree
    pub async fn revalidate(&self) -> LinkrotResult<RunSummary> {
        let dry_run = self.config.dry_run();
        let mut log = ReplacementLog::load_from_report(&self.config.replacement_report_path()).await?;
        let mut applier = ReplacementApplier::new(self.config.root_dir(), dry_run);
        let revalidator = self.revalidator();

        let (index, extraction) = self.extract().await?;
        let mut summary = RunSummary {
            extraction,
            ..Default::default()
        };

        let repaired = revalidator.repair_nested(&index, &mut applier).await;
        summary.repaired = repaired.actions.len();
        let mut errors = repaired.errors;
        let mut planned = Vec::new();
        let tree_changed = !dry_run && !repaired.actions.is_empty();
        record_actions(&mut log, &mut planned, repaired.actions, dry_run);

        let index = if tree_changed {
            self.extract().await?.0
        } else {
            index
        };
        let run = revalidator.run(&index, &log, &mut applier).await;
        summary.confirmed = run.count(Verdict::Confirmed);
        summary.reverted = run.count(Verdict::Reverted);
        errors.extend(run.rollbacks.errors);
        record_actions(&mut log, &mut planned, run.rollbacks.actions, dry_run);
        summary.errors = errors.len();

        let report = ReplacementReport {
            generated_at: chrono::Utc::now(),
            dry_run,
            actions: log.actions().to_vec(),
            planned,
            revalidation: run.entries,
            errors,
            ..Default::default()
        };
        self.write_replacement_report(&report, &mut summary).await?;
        Ok(summary)
    }

    /// Last checkpoint written by a probing run, if any
    pub async fn progress(&self) -> LinkrotResult<Option<Checkpoint>> {
        Checkpoint::read(&self.config.progress_path()).await
    }

    async fn checked_index(&self) -> LinkrotResult<(LinkIndex, RunSummary)> {
        let (mut index, extraction) = self.extract().await?;
        let liveness = self.probe_all(&mut index).await;
        let summary = RunSummary {
            extraction,
            liveness,
            categories: index.category_counts(),
            ..Default::default()
        };
        Ok((index, summary))
    }

    async fn write_liveness_report(
        &self,
        index: &LinkIndex,
        summary: &mut RunSummary,
    ) -> LinkrotResult<()> {
        let path = self.config.liveness_report_path();
        let report = LivenessReport::from_index(index, &summary.extraction);
        persist(&path, &report, summary).await
    }

    async fn write_replacement_report(
        &self,
        report: &ReplacementReport,
        summary: &mut RunSummary,
    ) -> LinkrotResult<()> {
        let path = self.config.replacement_report_path();
        persist(&path, report, summary).await
    }
}

/// Real actions join the history; dry-run actions are only planned
fn record_actions(
    log: &mut ReplacementLog,
    planned: &mut Vec<ReplacementAction>,
    actions: Vec<ReplacementAction>,
    dry_run: bool,
) {
    if dry_run {
        planned.extend(actions);
    } else {
        log.extend(actions);
    }
}

async fn persist<T: serde::Serialize>(
    path: &Path,
    value: &T,
    summary: &mut RunSummary,
) -> LinkrotResult<()> {
    write_json(path, value).await?;
    info!("Wrote {}", path.display());
    summary.reports.push(path.to_path_buf());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link_index::Occurrence;
    use crate::revalidate::RevalidationEntry;

    fn index_with(records: &[(&str, LinkStatus, Option<&str>)]) -> LinkIndex {
        let mut index = LinkIndex::new("/tree");
        for (url, status, replacement) in records {
            index.record_occurrence(
                url,
                Occurrence {
                    file: "a.md".into(),
                    line: 1,
                    preview: None,
                },
            );
            let record = index.get_mut(url).expect("record");
            record.status = *status;
            record.resolved_replacement = replacement.map(str::to_string);
        }
        index
    }

    #[test]
    fn pairs_only_for_pending_replacements() {
        let index = index_with(&[
            ("https://a.org", LinkStatus::Archived, Some("https://web.archive.org/web/1/https://a.org")),
            ("https://b.org", LinkStatus::HeuristicResolved, Some("https://www.b.org")),
            ("https://c.org", LinkStatus::Unresolved, None),
            ("https://d.org", LinkStatus::Live, None),
        ]);

        let pairs = LinkPipeline::<HttpProber>::replacement_pairs(&index);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].note, ReplacementNote::Archive);
        assert_eq!(pairs[1].note, ReplacementNote::Heuristic);
        assert_eq!(pairs[1].new_url, "https://www.b.org");
    }

    #[test]
    fn verdicts_fold_into_applied_records_only() {
        let mut index = index_with(&[
            ("https://a.org", LinkStatus::Applied, Some("https://web.archive.org/web/1/https://a.org")),
            ("https://b.org", LinkStatus::Applied, Some("https://web.archive.org/web/1/https://b.org")),
            ("https://c.org", LinkStatus::Live, None),
        ]);
        let entry = |original: &str, verdict| RevalidationEntry {
            snapshot_url: format!("https://web.archive.org/web/1/{original}"),
            original_url: original.to_string(),
            verdict,
            http_status: None,
            final_url: None,
            files: Vec::new(),
        };
        let run = RevalidationRun {
            entries: vec![
                entry("https://a.org", Verdict::Reverted),
                entry("https://b.org", Verdict::Inconclusive),
                entry("https://c.org", Verdict::Confirmed),
            ],
            rollbacks: ApplySummary::default(),
        };

        LinkPipeline::<HttpProber>::fold_verdicts(&mut index, &run);
        assert_eq!(index.get("https://a.org").expect("a").status, LinkStatus::Reverted);
        assert_eq!(index.get("https://b.org").expect("b").status, LinkStatus::Applied);
        assert_eq!(index.get("https://c.org").expect("c").status, LinkStatus::Live);
    }

    #[test]
    fn applied_heuristic_variants_end_confirmed() {
        let mut index = index_with(&[
            ("https://a.org", LinkStatus::Applied, Some("https://www.a.org")),
            ("https://b.org", LinkStatus::HeuristicResolved, Some("https://www.b.org")),
            ("https://c.org", LinkStatus::Applied, Some("https://web.archive.org/web/1/https://c.org")),
        ]);
        let heuristic = vec!["https://a.org".to_string(), "https://b.org".to_string()];

        let confirmed = LinkPipeline::<HttpProber>::confirm_heuristics(&mut index, &heuristic);
        assert_eq!(confirmed, 1);
        assert_eq!(index.get("https://a.org").expect("a").status, LinkStatus::Confirmed);
        assert_eq!(
            index.get("https://b.org").expect("b").status,
            LinkStatus::HeuristicResolved
        );
        assert_eq!(index.get("https://c.org").expect("c").status, LinkStatus::Applied);
    }

    #[test]
    fn dry_run_actions_stay_out_of_history() {
        let mut log = ReplacementLog::new();
        let mut planned = Vec::new();
        let action = ReplacementAction {
            file: "a.md".into(),
            old_url: "https://a.org".into(),
            new_url: "https://www.a.org".into(),
            applied_at: chrono::Utc::now(),
            note: ReplacementNote::Heuristic,
            lines: vec![1],
            occurrences_replaced: 1,
            dry_run: true,
        };

        record_actions(&mut log, &mut planned, vec![action.clone()], true);
        assert!(log.is_empty());
        assert_eq!(planned.len(), 1);

        record_actions(&mut log, &mut planned, vec![action], false);
        assert_eq!(log.len(), 1);
    }
}
