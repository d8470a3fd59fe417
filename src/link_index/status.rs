//! Lifecycle of a URL record.
//!
//! ```text
//! unknown ──2xx/3xx──▶ live
//!    └──fail/4xx/5xx──▶ dead ──snapshot──▶ archived ──────────┐
//!                        ├──live variant──▶ heuristic-resolved ┤
//!                        └──nothing──▶ unresolved              ▼
//!                                                           applied ──revalidation ok──▶ confirmed
//!                                                              └──snapshot gone──▶ reverted
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a URL record is in its lifecycle
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum LinkStatus {
    /// Extracted, not probed yet
    #[default]
    Unknown,
    /// Final status in [200, 400)
    Live,
    /// Probe failed or returned >= 400
    Dead,
    /// Archive snapshot found
    Archived,
    /// A live variant of the URL was found
    HeuristicResolved,
    /// No replacement found
    Unresolved,
    /// Replacement written to the tree
    Applied,
    /// Replacement undone because the snapshot became unavailable
    Reverted,
    /// Replacement re-probed and still available
    Confirmed,
}

impl LinkStatus {
    /// Whether the lifecycle has an edge from `self` to `next`
    #[must_use]
    pub const fn can_transition_to(self, next: LinkStatus) -> bool {
        use LinkStatus::*;
        matches!(
            (self, next),
            (Unknown, Live)
                | (Unknown, Dead)
                | (Dead, Archived)
                | (Dead, HeuristicResolved)
                | (Dead, Unresolved)
                | (Archived, Applied)
                | (HeuristicResolved, Applied)
                | (Applied, Reverted)
                | (Applied, Confirmed)
        )
    }

    /// No further transitions leave this status
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            LinkStatus::Live | LinkStatus::Unresolved | LinkStatus::Reverted | LinkStatus::Confirmed
        )
    }

    /// A replacement URL is known but not yet written
    #[must_use]
    pub const fn has_pending_replacement(self) -> bool {
        matches!(self, LinkStatus::Archived | LinkStatus::HeuristicResolved)
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkStatus::Unknown => "unknown",
            LinkStatus::Live => "live",
            LinkStatus::Dead => "dead",
            LinkStatus::Archived => "archived",
            LinkStatus::HeuristicResolved => "heuristic-resolved",
            LinkStatus::Unresolved => "unresolved",
            LinkStatus::Applied => "applied",
            LinkStatus::Reverted => "reverted",
            LinkStatus::Confirmed => "confirmed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::LinkStatus::*;
    use super::*;

    #[test]
    fn lifecycle_edges() {
        assert!(Unknown.can_transition_to(Live));
        assert!(Unknown.can_transition_to(Dead));
        assert!(Dead.can_transition_to(Archived));
        assert!(Dead.can_transition_to(HeuristicResolved));
        assert!(Dead.can_transition_to(Unresolved));
        assert!(Archived.can_transition_to(Applied));
        assert!(Applied.can_transition_to(Reverted));
        assert!(Applied.can_transition_to(Confirmed));

        assert!(!Live.can_transition_to(Dead));
        assert!(!Unknown.can_transition_to(Applied));
        assert!(!Unresolved.can_transition_to(Archived));
        assert!(!Reverted.can_transition_to(Applied));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        let all = [
            Unknown,
            Live,
            Dead,
            Archived,
            HeuristicResolved,
            Unresolved,
            Applied,
            Reverted,
            Confirmed,
        ];
        for from in all.into_iter().filter(|s| s.is_terminal()) {
            assert!(all.iter().all(|to| !from.can_transition_to(*to)), "{from} has an exit");
        }
    }

    #[test]
    fn serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&HeuristicResolved).expect("serialize"),
            "\"heuristic-resolved\""
        );
    }
}
