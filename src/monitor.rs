use tracing::info;

use crate::{
    prober::Transport, scheduler::Ticker, HttpTransport, Prober, ResolvedConfig, ServerResult,
    SweepReport,
};

/// Sequentially sweeps every server of every configured entity.
#[derive(Debug)]
pub struct Monitor<'a, T = HttpTransport> {
    config: &'a ResolvedConfig,
    prober: Prober<T>,
}

impl<'a, T: Transport> Monitor<'a, T> {
    pub fn new(config: &'a ResolvedConfig, prober: Prober<T>) -> Self {
        Self { config, prober }
    }

    pub fn prober(&self) -> &Prober<T> {
        &self.prober
    }

    /// Runs one full round, entities and servers in configuration order.
    pub async fn sweep(&self, round: u64) -> SweepReport {
        info!(round, targets = self.config.target_count(), "starting round");
        let mut results = Vec::with_capacity(self.config.target_count());

        for entity in self.config.entities() {
            info!(entity = %entity.name, servers = entity.servers.len(), "checking entity");
            for server in &entity.servers {
                let outcome = self.prober.check(server, &entity.policy).await;
                if outcome.healthy {
                    info!(entity = %entity.name, server = %server, "server responded OK");
                }
                results.push(ServerResult {
                    entity: entity.name.clone(),
                    server: server.clone(),
                    healthy: outcome.healthy,
                    attempts: outcome.attempts,
                    reason: outcome.last_failure.map(|failure| failure.to_string()),
                });
            }
        }

        let report = SweepReport { round, results };
        info!(
            round,
            healthy = report.healthy_count(),
            total = report.results.len(),
            "round finished"
        );
        report
    }

    /// Sweeps on every tick until the ticker stops. Returns the last report.
    pub async fn run(&self, mut ticker: Ticker) -> Option<SweepReport> {
        let mut last = None;
        while let Some(round) = ticker.tick().await {
            last = Some(self.sweep(round).await);
        }
        info!(rounds = ticker.rounds(), "monitor stopped");
        last
    }
}
