//! Revalidation of archive substitutions
//!
//! Archive snapshots are not guaranteed to stay available. This pass
//! re-probes every snapshot URL found in the tree and rolls the substitution
//! back when the snapshot is gone (404) or the archive now bounces to its
//! generic browse page instead of a capture.

use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;

use crate::archive::SnapshotUrls;
use crate::link_index::LinkIndex;
use crate::link_rewriter::{ApplySummary, ReplacementApplier, ReplacementLog, ReplacementNote, ReplacementPair};
use crate::probe::{LivenessProbe, ProbeOutcome};
use crate::throttle::RequestGate;

/// What re-probing a snapshot said
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// Snapshot still serves a capture
    Confirmed,
    /// Snapshot gone, original URL restored
    Reverted,
    /// Probe failed for another reason, substitution kept
    Inconclusive,
}

/// Result for one snapshot URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevalidationEntry {
    pub snapshot_url: String,
    pub original_url: String,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    pub files: Vec<PathBuf>,
}

/// Everything one revalidation pass did
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevalidationRun {
    pub entries: Vec<RevalidationEntry>,
    pub rollbacks: ApplySummary,
}

impl RevalidationRun {
    #[must_use]
    pub fn count(&self, verdict: Verdict) -> usize {
        self.entries.iter().filter(|e| e.verdict == verdict).count()
    }
}

/// Re-probes snapshot URLs one at a time, spaced by a fixed delay
pub struct Revalidator<P> {
    probe: P,
    snapshots: SnapshotUrls,
    gate: RequestGate,
}

impl<P: LivenessProbe> Revalidator<P> {
    #[must_use]
    pub fn new(probe: P, snapshots: SnapshotUrls, delay: Duration) -> Self {
        Self {
            probe,
            snapshots,
            gate: RequestGate::new(delay),
        }
    }

    /// Classify a probe of a snapshot URL
    #[must_use]
    pub fn verdict(&self, outcome: &ProbeOutcome) -> Verdict {
        if outcome.http_status == Some(404) {
            return Verdict::Reverted;
        }
        if outcome
            .final_url
            .as_deref()
            .is_some_and(|url| self.snapshots.is_wildcard(url))
        {
            return Verdict::Reverted;
        }
        if outcome.is_live() {
            Verdict::Confirmed
        } else {
            Verdict::Inconclusive
        }
    }

    /// `(snapshot, original)` for every capture URL in the index
    ///
    /// The original comes from the replacement log when it recorded the
    /// substitution, otherwise from the snapshot URL itself.
    #[must_use]
    pub fn targets(&self, index: &LinkIndex, log: &ReplacementLog) -> Vec<(String, String)> {
        index
            .iter()
            .filter_map(|record| {
                let snapshot = self.snapshots.parse(&record.url)?;
                if snapshot.is_wildcard() {
                    return None;
                }
                let original = log
                    .original_for(&record.url)
                    .or_else(|| self.snapshots.original_of(&record.url))?;
                Some((record.url.clone(), original.to_string()))
            })
            .collect()
    }

    /// Re-probe every snapshot and roll back the dead ones
    pub async fn run(
        &self,
        index: &LinkIndex,
        log: &ReplacementLog,
        applier: &mut ReplacementApplier,
    ) -> RevalidationRun {
        let targets = self.targets(index, log);
        info!("Revalidating {} archive URLs", targets.len());

        let mut run = RevalidationRun::default();
        for (snapshot_url, original_url) in targets {
            let outcome = {
                let _permit = self.gate.acquire().await;
                self.probe.probe(&snapshot_url).await
            };
            let verdict = self.verdict(&outcome);
            let files = index.files_for(&snapshot_url);

            match verdict {
                Verdict::Reverted => {
                    let pair = ReplacementPair::new(&original_url, &snapshot_url, ReplacementNote::Archive);
                    let rollback = applier.rollback(&pair, &files).await;
                    info!(
                        "Reverted {snapshot_url} -> {original_url} in {} files",
                        rollback.actions.len()
                    );
                    run.rollbacks.merge(rollback);
                }
                Verdict::Inconclusive => {
                    warn!(
                        "Revalidation inconclusive for {snapshot_url}: {}",
                        outcome.error.as_deref().unwrap_or("unexpected status")
                    );
                }
                Verdict::Confirmed => debug!("Snapshot still available: {snapshot_url}"),
            }

            run.entries.push(RevalidationEntry {
                snapshot_url,
                original_url,
                verdict,
                http_status: outcome.http_status,
                final_url: outcome.final_url,
                files: files
                    .iter()
                    .map(|f| f.strip_prefix(index.root()).unwrap_or(f).to_path_buf())
                    .collect(),
            });
        }

        info!(
            "Revalidation: {} confirmed, {} reverted, {} inconclusive",
            run.count(Verdict::Confirmed),
            run.count(Verdict::Reverted),
            run.count(Verdict::Inconclusive)
        );
        run
    }

    /// Collapse snapshots that wrap other snapshots to the innermost capture
    pub async fn repair_nested(&self, index: &LinkIndex, applier: &mut ReplacementApplier) -> ApplySummary {
        let mut summary = ApplySummary::default();
        for record in index.iter() {
            let Some(inner) = self.snapshots.collapse_nested(&record.url) else {
                continue;
            };
            let pair = ReplacementPair::new(&record.url, inner, ReplacementNote::NestedArchiveRepair);
            summary.merge(applier.apply_pair(&pair, &index.files_for(&record.url)).await);
        }
        if !summary.actions.is_empty() {
            info!("Repaired {} nested archive URLs", summary.actions.len());
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ErrorKind;

    struct Unused;

    impl LivenessProbe for Unused {
        async fn probe(&self, url: &str) -> ProbeOutcome {
            ProbeOutcome::status(200, url)
        }
    }

    fn revalidator() -> Revalidator<Unused> {
        Revalidator::new(
            Unused,
            SnapshotUrls::new("https://web.archive.org/web/"),
            Duration::ZERO,
        )
    }

    #[test]
    fn verdicts() {
        let r = revalidator();
        assert_eq!(
            r.verdict(&ProbeOutcome::status(404, "https://web.archive.org/web/2020/x")),
            Verdict::Reverted
        );
        assert_eq!(
            r.verdict(&ProbeOutcome::status(200, "https://web.archive.org/web/*/https://x.org")),
            Verdict::Reverted
        );
        assert_eq!(
            r.verdict(&ProbeOutcome::status(200, "https://web.archive.org/web/20200101/https://x.org")),
            Verdict::Confirmed
        );
        assert_eq!(
            r.verdict(&ProbeOutcome::failure(ErrorKind::Timeout, "slow")),
            Verdict::Inconclusive
        );
        assert_eq!(
            r.verdict(&ProbeOutcome::status(503, "https://web.archive.org/web/2020/x")),
            Verdict::Inconclusive
        );
    }

    #[test]
    fn targets_skip_wildcards_and_plain_urls() {
        let mut index = LinkIndex::new("/tree");
        for url in [
            "https://web.archive.org/web/20200101/https://x.org/a",
            "https://web.archive.org/web/*/https://x.org/b",
            "https://x.org/c",
        ] {
            index.record_occurrence(
                url,
                crate::link_index::Occurrence {
                    file: PathBuf::from("a.md"),
                    line: 1,
                    preview: None,
                },
            );
        }

        let targets = revalidator().targets(&index, &ReplacementLog::new());
        assert_eq!(
            targets,
            vec![(
                "https://web.archive.org/web/20200101/https://x.org/a".to_string(),
                "https://x.org/a".to_string()
            )]
        );
    }
}
