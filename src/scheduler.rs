//! Repeating timer that drives the sweep loop.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Default pause between two sweeps.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Paces rounds with a fixed pause and stops on cancellation or after an
/// optional number of rounds.
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    max_rounds: Option<u64>,
    rounds: u64,
    cancel: CancellationToken,
}

impl Ticker {
    pub fn new(interval: Duration, cancel: CancellationToken) -> Self {
        Self {
            interval,
            max_rounds: None,
            rounds: 0,
            cancel,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: Option<u64>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Waits for the next round and returns its 1-based number.
    ///
    /// The first round starts immediately. Later rounds start after the
    /// interval. Returns `None` once cancelled or the round limit is hit.
    pub async fn tick(&mut self) -> Option<u64> {
        if self.cancel.is_cancelled() {
            return None;
        }
        if self.max_rounds.is_some_and(|max| self.rounds >= max) {
            return None;
        }

        if self.rounds > 0 {
            tokio::select! {
                _ = self.cancel.cancelled() => return None,
                _ = sleep(self.interval) => {}
            }
        }

        self.rounds += 1;
        Some(self.rounds)
    }
}
