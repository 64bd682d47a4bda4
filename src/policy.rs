use std::time::Duration;

/// Per-attempt timeout used when the configuration leaves it out.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// Attempt budget used when the configuration leaves it out.
pub const DEFAULT_RETRIES: u32 = 3;
/// Wait between attempts used when the configuration leaves it out.
pub const DEFAULT_RETRY_WAIT_MS: u64 = 1_000;

/// Fully-resolved timeout and retry behavior for one entity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EffectivePolicy {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Total number of attempts (not retries after the first one).
    pub retries: u32,
    /// Fixed wait after each unsuccessful attempt in milliseconds.
    pub retry_wait_ms: u64,
}

impl EffectivePolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_wait(&self) -> Duration {
        Duration::from_millis(self.retry_wait_ms)
    }
}

impl Default for EffectivePolicy {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retries: DEFAULT_RETRIES,
            retry_wait_ms: DEFAULT_RETRY_WAIT_MS,
        }
    }
}
