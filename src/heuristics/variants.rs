//! Candidate generation for dead URLs
//!
//! Candidates come out in a fixed priority order: the `www.` toggle, then
//! every matching host rule in declaration order, then the archive browse
//! page. Duplicates and the dead URL itself are dropped.

use std::collections::HashSet;

use serde::Serialize;
use url::{Host, Url};

use super::rules::HostRule;
use crate::archive::SnapshotUrls;
use crate::utils::toggle_www;

/// How a candidate was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateKind {
    WwwToggle,
    HostRule,
    ArchiveWildcard,
}

/// One alternative URL to probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub url: String,
    pub kind: CandidateKind,
}

/// Ordered alternatives for `url`; empty if `url` does not parse
#[must_use]
pub fn variants_for(url: &str, rules: &[HostRule], snapshots: &SnapshotUrls) -> Vec<Candidate> {
    let Ok(parsed) = Url::parse(url) else {
        return Vec::new();
    };

    let mut candidates = Vec::new();
    if let Some(toggled) = toggle_www(url) {
        candidates.push(Candidate {
            url: toggled,
            kind: CandidateKind::WwwToggle,
        });
    }

    if let Some(Host::Domain(host)) = parsed.host() {
        for rule in rules.iter().filter(|rule| rule.matches(host)) {
            for target in &rule.hosts {
                if let Some(rewritten) = with_host(&parsed, target, rule.scheme.as_deref()) {
                    candidates.push(Candidate {
                        url: rewritten,
                        kind: CandidateKind::HostRule,
                    });
                }
            }
        }
    }

    candidates.push(Candidate {
        url: snapshots.wildcard(url),
        kind: CandidateKind::ArchiveWildcard,
    });

    let mut seen = HashSet::from([url.to_string()]);
    candidates.retain(|candidate| seen.insert(candidate.url.clone()));
    candidates
}

fn with_host(parsed: &Url, host: &str, scheme: Option<&str>) -> Option<String> {
    let mut rewritten = parsed.clone();
    rewritten.set_host(Some(host)).ok()?;
    if let Some(scheme) = scheme {
        rewritten.set_scheme(scheme).ok()?;
    }
    rewritten.set_fragment(None);
    Some(rewritten.to_string())
}
