//! Remote stand-in that only logs and waits

use std::time::Duration;

use super::{BestEffortTasks, RemoteSync};
use crate::models::{CurrentUser, SyncEntry};

/// Fixed delay before a simulated mutation sync reports completion
pub const SIMULATED_SYNC_LATENCY: Duration = Duration::from_millis(1000);

/// Fixed delay before the simulated startup pull reports completion
pub const SIMULATED_INITIAL_SYNC_LATENCY: Duration = Duration::from_millis(1500);

/// Pretends to talk to a server. Every call succeeds after a fixed delay.
#[derive(Debug, Clone, Default)]
pub struct SimulatedRemote {
    tasks: BestEffortTasks,
}

impl SimulatedRemote {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RemoteSync for SimulatedRemote {
    fn sync_mutation(&self, entry: &SyncEntry) {
        let kind = entry.kind();
        tracing::info!(record_id = entry.record_id(), "Syncing {kind} operation");

        self.tasks.spawn(kind.as_str(), async move {
            tokio::time::sleep(SIMULATED_SYNC_LATENCY).await;
            tracing::info!("Sync completed for {kind} operation");
        });
    }

    fn initial_sync(&self, user: &CurrentUser) {
        tracing::info!("Simulating initial sync from server for {}", user.email);

        self.tasks.spawn("initial_sync", async {
            tokio::time::sleep(SIMULATED_INITIAL_SYNC_LATENCY).await;
            tracing::info!("Initial sync completed");
        });
    }

    fn tasks(&self) -> &BestEffortTasks {
        &self.tasks
    }
}
