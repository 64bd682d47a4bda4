use std::{fmt, future::Future, time::Duration};

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{EffectivePolicy, Result, SweepError};

const USER_AGENT: &str = concat!("healthsweep/", env!("CARGO_PKG_VERSION"));

/// Issues a single GET and reports the response status.
///
/// Implementations must drain the response body before returning.
pub trait Transport {
    type Error: fmt::Display;

    fn get(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = std::result::Result<u16, Self::Error>> + Send;
}

/// `reqwest`-backed transport shared across every probe.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(SweepError::Transport)?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    type Error = reqwest::Error;

    async fn get(&self, url: &str, timeout: Duration) -> std::result::Result<u16, reqwest::Error> {
        let mut response = self.http.get(url).timeout(timeout).send().await?;
        let status = response.status().as_u16();

        loop {
            match response.chunk().await {
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(err) => {
                    debug!(url, error = %err, "response body drain failed");
                    break;
                }
            }
        }

        Ok(status)
    }
}

/// Why the last attempt of a probe failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProbeFailure {
    /// Connection, DNS, timeout or request-build error.
    Transport(String),
    /// A response arrived with a status outside `[200, 400)`.
    Status(u16),
    /// The policy allows zero attempts.
    NoAttempts,
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::Transport(message) => f.write_str(message),
            ProbeFailure::Status(status) => write!(f, "status {status}"),
            ProbeFailure::NoAttempts => f.write_str("retry budget is zero"),
        }
    }
}

/// Detailed result of one probe.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProbeOutcome {
    pub url: String,
    pub healthy: bool,
    pub attempts: u32,
    pub last_failure: Option<ProbeFailure>,
}

/// Bounded-retry HTTP health prober.
#[derive(Clone, Debug)]
pub struct Prober<T = HttpTransport> {
    transport: T,
}

impl Prober<HttpTransport> {
    /// Creates a prober over a fresh HTTP client.
    pub fn new() -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new()?))
    }
}

impl<T: Transport> Prober<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns `true` once any attempt gets a status in `[200, 400)`.
    pub async fn probe(&self, endpoint: &str, policy: &EffectivePolicy) -> bool {
        self.check(endpoint, policy).await.healthy
    }

    /// Probes `endpoint` with up to `policy.retries` attempts.
    ///
    /// Every unsuccessful attempt, including the last, is followed by a
    /// `retry_wait` sleep. Failures never escape: exhaustion is logged
    /// once and reported through the outcome.
    pub async fn check(&self, endpoint: &str, policy: &EffectivePolicy) -> ProbeOutcome {
        let url = normalize_url(endpoint);
        let mut last_failure = None;
        let mut attempts = 0u32;

        while attempts < policy.retries {
            attempts += 1;
            match self.transport.get(&url, policy.timeout()).await {
                Ok(status) if is_success_status(status) => {
                    debug!(url = %url, status, attempts, "probe succeeded");
                    return ProbeOutcome {
                        url,
                        healthy: true,
                        attempts,
                        last_failure: None,
                    };
                }
                Ok(status) => {
                    debug!(url = %url, status, attempt = attempts, "unhealthy status");
                    last_failure = Some(ProbeFailure::Status(status));
                }
                Err(err) => {
                    debug!(url = %url, error = %err, attempt = attempts, "attempt failed");
                    last_failure = Some(ProbeFailure::Transport(err.to_string()));
                }
            }
            sleep(policy.retry_wait()).await;
        }

        let failure = last_failure.unwrap_or(ProbeFailure::NoAttempts);
        warn!(url = %url, attempts, reason = %failure, "server did not respond");
        ProbeOutcome {
            url,
            healthy: false,
            attempts,
            last_failure: Some(failure),
        }
    }
}

/// `[200, 400)` counts as healthy.
pub fn is_success_status(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Prefixes `http://` unless the endpoint already names `http` or `https`.
///
/// Example: `"example.com:8080"` → `"http://example.com:8080"`
pub fn normalize_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if has_scheme(trimmed, "http://") || has_scheme(trimmed, "https://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    }
}

fn has_scheme(value: &str, scheme: &str) -> bool {
    value
        .get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}
