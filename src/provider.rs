//! Client for the auxiliary DNS/edge provider API.
//!
//! The monitor only needs it to look up identifiers (zone details) at
//! startup. It is built once from the token returned by
//! [`Config::lookup`]; a build failure is fatal to startup.

use std::{fmt, time::Duration};

use reqwest::header;
use tracing::debug;

use crate::{
    wire::{self, Envelope},
    Config, ConfigKey, Result, SweepError, Zone,
};

/// Base URL used when the config does not set `provider.api_url`.
pub const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client/v4";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
/// HTTP client for the provider REST API.
pub struct ProviderClient {
    http: reqwest::Client,
    api_url: String,
    authorization: String,
    account_id: Option<String>,
    zone_id: Option<String>,
    timeout: Duration,
}

impl fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClient")
            .field("api_url", &self.api_url)
            .field("authorization", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("zone_id", &self.zone_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderClient {
    /// Creates a client from a bearer token.
    ///
    /// If the token is missing the `Bearer ` prefix, it is added
    /// automatically. An empty token is rejected.
    pub fn new(api_url: impl Into<String>, token: impl AsRef<str>) -> Result<Self> {
        let token = token.as_ref().trim();
        if token.is_empty() {
            return Err(SweepError::InvalidConfig(
                "provider token is empty".to_owned(),
            ));
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(SweepError::Transport)?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_owned(),
            authorization: normalize_bearer_authorization(token),
            account_id: None,
            zone_id: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Builds the client from the global provider block.
    ///
    /// Returns `Ok(None)` when the configuration has no provider block.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(credentials) = config.global.provider.as_ref() else {
            return Ok(None);
        };
        let token = config.lookup("", ConfigKey::ProviderToken);
        let api_url = credentials.api_url.as_deref().unwrap_or(DEFAULT_API_URL);

        let mut client = Self::new(api_url, token.as_text().unwrap_or_default())?;
        client.account_id = config
            .lookup("", ConfigKey::ProviderAccountId)
            .as_text()
            .map(str::to_owned);
        client.zone_id = config
            .lookup("", ConfigKey::ProviderZoneId)
            .as_text()
            .map(str::to_owned);
        Ok(Some(client))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn zone_id(&self) -> Option<&str> {
        self.zone_id.as_deref()
    }

    /// Fetches zone details by identifier.
    pub async fn zone(&self, zone_id: &str) -> Result<Zone> {
        let url = format!("{}/zones/{}", self.api_url, zone_id.trim());
        debug!(url = %url, "looking up provider zone");

        let response = self
            .http
            .get(&url)
            .header(header::AUTHORIZATION, &self.authorization)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(SweepError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(SweepError::Transport)?;
        if !status.is_success() {
            return Err(SweepError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope<wire::ZoneRecord> =
            serde_json::from_str(&body).map_err(|err| {
                SweepError::Decode(format!("invalid zone response JSON: {err}; body: {body}"))
            })?;

        if !envelope.success {
            let message = envelope
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(SweepError::Provider(message));
        }

        let record = envelope
            .result
            .ok_or_else(|| SweepError::Decode("missing zone result payload".to_owned()))?;
        Ok(Zone {
            id: record.id,
            name: record.name,
            status: record.status,
        })
    }
}

/// Accepts either a bare API token or a full `Bearer <token>` value.
fn normalize_bearer_authorization(token: &str) -> String {
    const SCHEME: &str = "Bearer ";
    let token = token.trim();
    match token.get(..SCHEME.len()) {
        Some(scheme) if scheme.eq_ignore_ascii_case(SCHEME) => token.to_owned(),
        _ => format!("{SCHEME}{token}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_bearer_authorization, ProviderClient, DEFAULT_API_URL};
    use crate::{Config, SweepError};

    #[test]
    fn api_token_gets_bearer_scheme() {
        assert_eq!(
            normalize_bearer_authorization("  Yx9_kQ2-apiToken40chars  "),
            "Bearer Yx9_kQ2-apiToken40chars"
        );
    }

    #[test]
    fn pasted_authorization_header_value_is_kept() {
        assert_eq!(
            normalize_bearer_authorization("BEARER Yx9_kQ2-apiToken"),
            "BEARER Yx9_kQ2-apiToken"
        );
        // "Bearer" without the separating space is part of the token.
        assert_eq!(
            normalize_bearer_authorization("BearerYx9"),
            "Bearer BearerYx9"
        );
    }

    #[test]
    fn short_token_does_not_panic() {
        assert_eq!(normalize_bearer_authorization("ab"), "Bearer ab");
    }

    #[test]
    fn debug_redacts_authorization_value() {
        let client = ProviderClient::new(DEFAULT_API_URL, "secret-token")
            .expect("client must build");
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn empty_token_is_rejected() {
        let err = ProviderClient::new(DEFAULT_API_URL, "   ").expect_err("must fail");
        assert!(matches!(err, SweepError::InvalidConfig(_)));
    }

    #[test]
    fn from_config_without_provider_block_is_none() {
        let config = Config::default();
        let client = ProviderClient::from_config(&config).expect("must not fail");
        assert!(client.is_none());
    }

    #[test]
    fn from_config_reads_global_credentials() {
        let config = Config::from_yaml_str(
            r#"
global:
  provider:
    api_url: "https://provider.test/v4/"
    token: "tok"
    zone_id: "zone-1"
"#,
        )
        .expect("config must parse");

        let client = ProviderClient::from_config(&config)
            .expect("client must build")
            .expect("provider block is present");

        assert_eq!(client.zone_id(), Some("zone-1"));
        assert_eq!(client.account_id(), None);
        assert!(format!("{client:?}").contains("https://provider.test/v4\""));
    }

    #[test]
    fn from_config_with_empty_token_fails() {
        let config = Config::from_yaml_str(
            r#"
global:
  provider:
    zone_id: "zone-1"
"#,
        )
        .expect("config must parse");

        assert!(ProviderClient::from_config(&config).is_err());
    }
}
