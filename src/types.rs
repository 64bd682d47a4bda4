/// Result of probing one server of one entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerResult {
    pub entity: String,
    pub server: String,
    pub healthy: bool,
    pub attempts: u32,
    pub reason: Option<String>,
}

/// Everything observed during one sweep over all entities.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// 1-based round counter.
    pub round: u64,
    pub results: Vec<ServerResult>,
}

impl SweepReport {
    pub fn healthy_count(&self) -> usize {
        self.results.iter().filter(|r| r.healthy).count()
    }

    pub fn unhealthy(&self) -> impl Iterator<Item = &ServerResult> {
        self.results.iter().filter(|r| !r.healthy)
    }

    pub fn all_healthy(&self) -> bool {
        self.results.iter().all(|r| r.healthy)
    }
}

/// Zone details returned by the provider API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub status: Option<String>,
}
