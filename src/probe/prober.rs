//! HTTP liveness prober.
//!
//! Redirects are followed by hand rather than by reqwest's redirect policy so
//! that the budget is explicit, each hop is observable in logs, and the final
//! URL is reported exactly as the last server saw it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, LOCATION};
use reqwest::{Client, Method, redirect};
use url::Url;

use super::outcome::{ErrorKind, ProbeOutcome, error_chain_message};
use crate::config::LinkCheckConfig;
use crate::error::LinkrotResult;

/// Anything that can tell whether a URL is reachable
///
/// The scheduler, the heuristic resolver and the revalidation pass are all
/// generic over this trait so they can be driven by a scripted probe in tests.
pub trait LivenessProbe: Send + Sync {
    /// Check a URL, never failing: transport errors become outcomes
    fn probe(&self, url: &str) -> impl Future<Output = ProbeOutcome> + Send;
}

impl<P: LivenessProbe> LivenessProbe for Arc<P> {
    fn probe(&self, url: &str) -> impl Future<Output = ProbeOutcome> + Send {
        (**self).probe(url)
    }
}

/// reqwest-backed prober with HEAD→GET fallback and bounded redirects
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    timeout: Duration,
    max_redirects: u8,
}

impl HttpProber {
    /// Create a prober
    ///
    /// # Arguments
    /// * `timeout` - Per-attempt timeout (each redirect hop is one attempt)
    /// * `max_redirects` - Redirect budget per request
    /// * `user_agent` - User-Agent header sent with every request
    pub fn new(timeout: Duration, max_redirects: u8, user_agent: &str) -> LinkrotResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );

        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .user_agent(user_agent)
            .default_headers(headers)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            timeout,
            max_redirects,
        })
    }

    /// Create a prober from the pipeline configuration
    pub fn from_config(config: &LinkCheckConfig) -> LinkrotResult<Self> {
        Self::new(
            config.probe_timeout(),
            config.max_redirects(),
            config.user_agent(),
        )
    }

    #[must_use]
    pub fn max_redirects(&self) -> u8 {
        self.max_redirects
    }

    /// Issue `method` against `url`, following at most `max_redirects` hops
    ///
    /// A 3xx that arrives with the budget exhausted (or without a usable
    /// `Location`) is returned as the final status.
    pub async fn request(&self, url: &str, method: Method) -> ProbeOutcome {
        let mut current = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => return ProbeOutcome::failure(ErrorKind::InvalidUrl, e.to_string()),
        };
        let mut budget = self.max_redirects;

        loop {
            let response = match self
                .client
                .request(method.clone(), current.clone())
                .timeout(self.timeout)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    let kind = ErrorKind::from_reqwest(&e);
                    let message = error_chain_message(&e);
                    debug!("{method} {current} failed ({kind}): {message}");
                    return ProbeOutcome::failure(kind, message);
                }
            };

            let status = response.status();
            if status.is_redirection() && budget > 0 {
                let next = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|location| current.join(location).ok());

                if let Some(next) = next {
                    debug!("{method} {current} -> {} {next}", status.as_u16());
                    budget -= 1;
                    current = next;
                    continue;
                }
            }

            return ProbeOutcome::status(status.as_u16(), current.as_str());
        }
    }

    /// Liveness check: HEAD first, GET when HEAD is inconclusive
    ///
    /// Some origins reject HEAD (405/501) or answer it with an error while
    /// serving GET normally, so any HEAD failure or status >= 400 earns a
    /// GET. The GET result is authoritative.
    pub async fn check(&self, url: &str) -> ProbeOutcome {
        let head = self.request(url, Method::HEAD).await;
        if !needs_get_fallback(&head) {
            return head;
        }

        debug!("HEAD inconclusive for {url}, retrying with GET");
        self.request(url, Method::GET).await
    }
}

impl LivenessProbe for HttpProber {
    fn probe(&self, url: &str) -> impl Future<Output = ProbeOutcome> + Send {
        self.check(url)
    }
}

/// No status, 405/501, or any status >= 400
fn needs_get_fallback(outcome: &ProbeOutcome) -> bool {
    match outcome.http_status {
        None => true,
        Some(405 | 501) => true,
        Some(status) => status >= 400,
    }
}
