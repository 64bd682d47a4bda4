//! Configuration loading and global-default resolution.
//!
//! A [`Config`] is parsed from YAML, validated, and then consumed exactly
//! once by [`Config::resolve`] into an immutable [`ResolvedConfig`] that
//! the monitor runs from.

use std::{collections::HashSet, fmt, fs, path::Path, str::FromStr};

use serde::Deserialize;

use crate::{
    policy::{DEFAULT_RETRIES, DEFAULT_RETRY_WAIT_MS, DEFAULT_TIMEOUT_MS},
    EffectivePolicy, Result, SweepError,
};

/// Process-wide fallback values.
///
/// A field missing from the `global` block takes the built-in default
/// ([`DEFAULT_TIMEOUT_MS`], [`DEFAULT_RETRIES`], [`DEFAULT_RETRY_WAIT_MS`])
/// rather than zero, so an empty block still probes. `timeout` must be
/// non-zero.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct GlobalPolicy {
    #[serde(rename = "timeout", default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(rename = "retry_wait", default = "default_retry_wait_ms")]
    pub retry_wait_ms: u64,
    #[serde(default)]
    pub provider: Option<ProviderCredentials>,
}

impl GlobalPolicy {
    pub fn policy(&self) -> EffectivePolicy {
        EffectivePolicy {
            timeout_ms: self.timeout_ms,
            retries: self.retries,
            retry_wait_ms: self.retry_wait_ms,
        }
    }
}

impl Default for GlobalPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retries: DEFAULT_RETRIES,
            retry_wait_ms: DEFAULT_RETRY_WAIT_MS,
            provider: None,
        }
    }
}

/// One named entity and its optional policy overrides.
///
/// An absent field inherits the global value. A present zero is kept for
/// `retries` and `retry_wait`, so `retries: 0` really means "never probe".
/// A zero `timeout` has no usable meaning and inherits like an absent one.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct EntityPolicy {
    pub name: String,
    #[serde(default)]
    pub servers: Vec<String>,
    #[serde(rename = "timeout", default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub retries: Option<u32>,
    #[serde(rename = "retry_wait", default)]
    pub retry_wait_ms: Option<u64>,
    #[serde(default)]
    pub provider: Option<ProviderCredentials>,
}

impl EntityPolicy {
    /// Fills every absent policy field from `global`.
    pub fn inherit(&mut self, global: &GlobalPolicy) {
        self.timeout_ms = Some(self.timeout_override().unwrap_or(global.timeout_ms));
        self.retries.get_or_insert(global.retries);
        self.retry_wait_ms.get_or_insert(global.retry_wait_ms);
    }

    pub fn effective(&self, global: &GlobalPolicy) -> EffectivePolicy {
        EffectivePolicy {
            timeout_ms: self.timeout_override().unwrap_or(global.timeout_ms),
            retries: self.retries.unwrap_or(global.retries),
            retry_wait_ms: self.retry_wait_ms.unwrap_or(global.retry_wait_ms),
        }
    }

    /// The entity's own timeout, ignoring zero.
    pub fn timeout_override(&self) -> Option<u64> {
        self.timeout_ms.filter(|&ms| ms > 0)
    }
}

/// Credentials for the auxiliary provider API.
#[derive(Clone, Default, Eq, PartialEq, Deserialize)]
pub struct ProviderCredentials {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub zone_id: Option<String>,
}

impl ProviderCredentials {
    fn get(&self, key: ConfigKey) -> Option<&str> {
        match key {
            ConfigKey::ProviderToken => self.token.as_deref(),
            ConfigKey::ProviderAccountId => self.account_id.as_deref(),
            ConfigKey::ProviderZoneId => self.zone_id.as_deref(),
            ConfigKey::Timeout | ConfigKey::Retries | ConfigKey::RetryWait => None,
        }
    }
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("account_id", &self.account_id)
            .field("zone_id", &self.zone_id)
            .finish()
    }
}

/// Applies global defaults to every entity.
///
/// Only absent fields are filled, so applying this to its own output
/// returns the same list.
pub fn resolve(global: &GlobalPolicy, entities: &[EntityPolicy]) -> Vec<EntityPolicy> {
    entities
        .iter()
        .cloned()
        .map(|mut entity| {
            entity.inherit(global);
            entity
        })
        .collect()
}

/// Parsed configuration document.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalPolicy,
    #[serde(default)]
    pub entities: Vec<EntityPolicy>,
}

impl Config {
    /// Reads, parses and validates a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SweepError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parses and validates a YAML configuration document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Entity names must be non-empty and unique, and the global timeout
    /// must be non-zero.
    pub fn validate(&self) -> Result<()> {
        if self.global.timeout_ms == 0 {
            return Err(SweepError::InvalidConfig(
                "global timeout must be greater than zero".to_owned(),
            ));
        }

        let mut seen = HashSet::with_capacity(self.entities.len());
        for (index, entity) in self.entities.iter().enumerate() {
            let name = entity.name.trim();
            if name.is_empty() {
                return Err(SweepError::InvalidConfig(format!(
                    "entity at index {index} has an empty name"
                )));
            }
            if !seen.insert(name) {
                return Err(SweepError::InvalidConfig(format!(
                    "duplicate entity name '{name}'"
                )));
            }
        }
        Ok(())
    }

    pub fn entity(&self, name: &str) -> Option<&EntityPolicy> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    /// Resolve-by-name: the entity's value for `key` if it sets one,
    /// otherwise the global value, otherwise [`ConfigValue::Empty`].
    ///
    /// An empty or unknown `name` reads the global value directly.
    pub fn lookup(&self, name: &str, key: ConfigKey) -> ConfigValue {
        let entity = if name.is_empty() {
            None
        } else {
            self.entity(name)
        };

        match key {
            ConfigKey::Timeout => ConfigValue::Number(
                entity
                    .and_then(EntityPolicy::timeout_override)
                    .unwrap_or(self.global.timeout_ms),
            ),
            ConfigKey::Retries => ConfigValue::Number(u64::from(
                entity
                    .and_then(|e| e.retries)
                    .unwrap_or(self.global.retries),
            )),
            ConfigKey::RetryWait => ConfigValue::Number(
                entity
                    .and_then(|e| e.retry_wait_ms)
                    .unwrap_or(self.global.retry_wait_ms),
            ),
            ConfigKey::ProviderToken | ConfigKey::ProviderAccountId | ConfigKey::ProviderZoneId => {
                let pick = |creds: Option<&ProviderCredentials>| -> Option<String> {
                    creds
                        .and_then(|c| c.get(key))
                        .map(str::trim)
                        .filter(|value| !value.is_empty())
                        .map(str::to_owned)
                };
                pick(entity.and_then(|e| e.provider.as_ref()))
                    .or_else(|| pick(self.global.provider.as_ref()))
                    .map_or(ConfigValue::Empty, ConfigValue::Text)
            }
        }
    }

    /// Runs the single defaulting pass.
    pub fn resolve(self) -> ResolvedConfig {
        let global = self.global;
        let entities = self
            .entities
            .into_iter()
            .map(|entity| ResolvedEntity {
                policy: entity.effective(&global),
                name: entity.name,
                servers: entity.servers,
            })
            .collect();
        ResolvedConfig { global, entities }
    }
}

/// Field keys accepted by [`Config::lookup`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ConfigKey {
    Timeout,
    Retries,
    RetryWait,
    ProviderToken,
    ProviderAccountId,
    ProviderZoneId,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::Timeout,
        ConfigKey::Retries,
        ConfigKey::RetryWait,
        ConfigKey::ProviderToken,
        ConfigKey::ProviderAccountId,
        ConfigKey::ProviderZoneId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Timeout => "timeout",
            ConfigKey::Retries => "retries",
            ConfigKey::RetryWait => "retry_wait",
            ConfigKey::ProviderToken => "provider_token",
            ConfigKey::ProviderAccountId => "provider_account_id",
            ConfigKey::ProviderZoneId => "provider_zone_id",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = SweepError;

    fn from_str(value: &str) -> Result<Self> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| SweepError::UnknownKey(value.to_owned()))
    }
}

/// Result of [`Config::lookup`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigValue {
    Number(u64),
    Text(String),
    Empty,
}

impl ConfigValue {
    pub fn as_number(&self) -> Option<u64> {
        match self {
            ConfigValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ConfigValue::Empty)
    }
}

/// Configuration after the defaulting pass. Read-only.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedConfig {
    global: GlobalPolicy,
    entities: Vec<ResolvedEntity>,
}

impl ResolvedConfig {
    pub fn global(&self) -> &GlobalPolicy {
        &self.global
    }

    pub fn entities(&self) -> &[ResolvedEntity] {
        &self.entities
    }

    /// Total number of (entity, server) pairs probed per round.
    pub fn target_count(&self) -> usize {
        self.entities.iter().map(|e| e.servers.len()).sum()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedEntity {
    pub name: String,
    pub servers: Vec<String>,
    pub policy: EffectivePolicy,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

fn default_retry_wait_ms() -> u64 {
    DEFAULT_RETRY_WAIT_MS
}
