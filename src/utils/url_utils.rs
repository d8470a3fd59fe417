//! URL manipulation utilities.
//!
//! Helpers shared by the extractor, the replacement applier, the heuristic
//! variant generator and the archive resolver.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use url::{Host, Url};

/// `http(s)://` followed by anything that cannot close a quoted string,
/// markup attribute, bracket or paren
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s'"`)<>\]}]+"#).expect("Invalid URL pattern regex")
});

/// Characters that end a sentence or close a construct around a URL but are
/// almost never the last character of the URL itself.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')'];

/// Strip punctuation that the URL pattern swallowed from the surrounding text.
///
/// `"https://example.org/a)."` becomes `"https://example.org/a"`.
#[inline]
#[must_use]
pub fn strip_trailing_punctuation(url: &str) -> &str {
    url.trim_end_matches(TRAILING_PUNCTUATION)
}

/// Byte ranges of every URL in `text`, trailing punctuation excluded
///
/// A URL runs until a character that cannot continue it, so
/// `https://example.org/a` is not found inside `https://example.org/about`
/// or inside a snapshot URL that wraps it.
pub fn url_spans(text: &str) -> impl Iterator<Item = Range<usize>> + '_ {
    URL_PATTERN.find_iter(text).map(|found| {
        let url = strip_trailing_punctuation(found.as_str());
        found.start()..found.start() + url.len()
    })
}

/// Check if a URL is a valid absolute http(s) URL
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some(),
        Err(_) => false,
    }
}

/// Toggle the `www.` prefix of a URL's host.
///
/// Returns `None` for unparseable URLs and for IP-address hosts, where a
/// `www.` variant is meaningless. The fragment is dropped.
#[must_use]
pub fn toggle_www(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    let host = match parsed.host()? {
        Host::Domain(domain) => domain.to_string(),
        Host::Ipv4(_) | Host::Ipv6(_) => return None,
    };

    let toggled = match host.strip_prefix("www.") {
        Some(bare) if !bare.is_empty() => bare.to_string(),
        _ => format!("www.{host}"),
    };

    parsed.set_host(Some(&toggled)).ok()?;
    parsed.set_fragment(None);
    Some(parsed.to_string())
}

/// Rewrite a leading `http:` scheme to `https:`.
///
/// Archive snapshot URLs come back from the lookup API as `http://`; every
/// archive host serves the same capture over TLS.
#[must_use]
pub fn upgrade_to_https(url: &str) -> String {
    match url.strip_prefix("http:") {
        Some(rest) => format!("https:{rest}"),
        None => url.to_string(),
    }
}
