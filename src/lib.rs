//! `healthsweep` periodically probes HTTP endpoints grouped by entity.
//!
//! The crate is built from a few pieces:
//! - [`Config`] loads the YAML document and [`Config::resolve`] applies
//!   global defaults, producing a read-only [`ResolvedConfig`]
//! - [`Prober`] runs bounded-retry GET probes with fixed backoff
//! - [`Monitor`] sweeps every entity's servers in order, paced by a
//!   cancellable [`Ticker`]
//! - [`ProviderClient`] talks to the auxiliary provider API

mod config;
mod error;
mod monitor;
mod policy;
mod prober;
mod provider;
mod scheduler;
mod types;
mod wire;

pub use config::{
    resolve, Config, ConfigKey, ConfigValue, EntityPolicy, GlobalPolicy, ProviderCredentials,
    ResolvedConfig, ResolvedEntity,
};
pub use error::SweepError;
pub use monitor::Monitor;
pub use policy::{EffectivePolicy, DEFAULT_RETRIES, DEFAULT_RETRY_WAIT_MS, DEFAULT_TIMEOUT_MS};
pub use prober::{
    is_success_status, normalize_url, HttpTransport, ProbeFailure, ProbeOutcome, Prober,
    Transport,
};
pub use provider::{ProviderClient, DEFAULT_API_URL};
pub use scheduler::{Ticker, DEFAULT_INTERVAL};
pub use types::{ServerResult, SweepReport, Zone};

pub type Result<T> = std::result::Result<T, SweepError>;
