//! Heuristic alternatives for dead URLs
//!
//! Many dead links only suffer from a host mismatch (`www.` or a moved
//! subdomain). Probing a few derived candidates finds a live current page
//! before falling back to an archived copy.

pub mod rules;
pub mod variants;

use log::debug;

pub use rules::HostRule;
pub use variants::{Candidate, CandidateKind, variants_for};

use crate::archive::SnapshotUrls;
use crate::probe::LivenessProbe;

/// Probes derived candidates and keeps the first live one
pub struct HeuristicResolver<P> {
    probe: P,
    rules: Vec<HostRule>,
    snapshots: SnapshotUrls,
}

impl<P: LivenessProbe> HeuristicResolver<P> {
    #[must_use]
    pub fn new(probe: P, rules: Vec<HostRule>, snapshots: SnapshotUrls) -> Self {
        Self {
            probe,
            rules,
            snapshots,
        }
    }

    #[must_use]
    pub fn candidates(&self, url: &str) -> Vec<Candidate> {
        variants_for(url, &self.rules, &self.snapshots)
    }

    /// First live candidate, probing one at a time in priority order
    pub async fn find_live(&self, url: &str) -> Option<Candidate> {
        for candidate in self.candidates(url) {
            let outcome = self.probe.probe(&candidate.url).await;
            if outcome.is_live() {
                debug!("Live variant for {url}: {}", candidate.url);
                return Some(candidate);
            }
            debug!(
                "Variant {} for {url} is dead ({:?})",
                candidate.url,
                outcome.category()
            );
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::probe::ProbeOutcome;

    #[derive(Default)]
    struct RecordingProbe {
        live: Vec<&'static str>,
        seen: Mutex<Vec<String>>,
    }

    impl LivenessProbe for RecordingProbe {
        async fn probe(&self, url: &str) -> ProbeOutcome {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(url.to_string());
            }
            let status = if self.live.iter().any(|live| *live == url) { 200 } else { 404 };
            ProbeOutcome::status(status, url)
        }
    }

    fn resolver(live: Vec<&'static str>) -> HeuristicResolver<RecordingProbe> {
        HeuristicResolver::new(
            RecordingProbe {
                live,
                ..RecordingProbe::default()
            },
            HostRule::defaults(),
            SnapshotUrls::new("https://web.archive.org/web/"),
        )
    }

    #[tokio::test]
    async fn first_live_variant_wins_and_stops_probing() {
        let resolver = resolver(vec![
            "http://www.courtlistener.com/x",
            "http://courtlistener.com/x",
        ]);
        let found = resolver
            .find_live("http://storage.courtlistener.com/x")
            .await
            .expect("live variant");

        assert_eq!(found.url, "http://www.courtlistener.com/x");
        assert_eq!(found.kind, CandidateKind::HostRule);
        let seen = resolver.probe.seen.lock().expect("lock").clone();
        assert_eq!(seen.len(), 2);
    }

    #[tokio::test]
    async fn nothing_live_is_none() {
        let resolver = resolver(Vec::new());
        assert_eq!(resolver.find_live("https://example.org/gone").await, None);
    }
}
