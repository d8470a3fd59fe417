//! Host rewrite rules
//!
//! A rule says: "when a dead URL's host looks like X, also try these hosts".
//! Rules are plain data so they can be extended from the config file.

use serde::{Deserialize, Serialize};

/// Known host move for a family of dead URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRule {
    /// Substring the host must contain
    pub host_contains: String,
    /// Prefix the host must also start with, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_prefix: Option<String>,
    /// Replacement hosts, tried in order
    pub hosts: Vec<String>,
    /// Scheme forced on the candidates, original scheme otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

impl HostRule {
    #[must_use]
    pub fn new(host_contains: &str, hosts: &[&str]) -> Self {
        Self {
            host_contains: host_contains.to_string(),
            host_prefix: None,
            hosts: hosts.iter().map(|h| (*h).to_string()).collect(),
            scheme: None,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.host_prefix = Some(prefix.to_string());
        self
    }

    #[must_use]
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = Some(scheme.to_string());
        self
    }

    #[must_use]
    pub fn matches(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        host.contains(&self.host_contains)
            && self
                .host_prefix
                .as_deref()
                .is_none_or(|prefix| host.starts_with(prefix))
    }

    /// Rules for hosts that are known to have moved or been consolidated
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("nytimes.com", &["www.nytimes.com"]).with_prefix("int."),
            Self::new("courtlistener", &["www.courtlistener.com", "courtlistener.com"]),
            Self::new("manhattanda", &["www.manhattanda.org", "manhattanda.org"]),
            Self::new("oversight.house.gov", &["oversight.house.gov"]),
            Self::new("whitehouse.gov", &["www.whitehouse.gov"]).with_scheme("https"),
            Self::new("supremecourt.gov", &["www.supremecourt.gov"]).with_scheme("https"),
        ]
    }
}
