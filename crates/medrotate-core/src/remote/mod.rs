//! Remote side of synchronization
//!
//! Every call into a [`RemoteSync`] is a best-effort notification: it is
//! spawned without a join, its outcome is only logged, and nothing it returns
//! flows back into local state.

mod http;
mod simulated;
#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinSet;

use crate::models::{CurrentUser, SyncEntry};

pub use http::{HttpProbe, HttpRemote, DEFAULT_API_BASE_URL};
pub use simulated::{SimulatedRemote, SIMULATED_INITIAL_SYNC_LATENCY, SIMULATED_SYNC_LATENCY};

/// Fire-and-forget sink for local mutations
pub trait RemoteSync {
    /// Announce one mutation to the remote; never awaited by the caller
    fn sync_mutation(&self, entry: &SyncEntry);

    /// Announce the startup pull for a signed-in user
    fn initial_sync(&self, user: &CurrentUser);

    /// Tasks spawned by this remote
    fn tasks(&self) -> &BestEffortTasks;
}

impl<T: RemoteSync + ?Sized> RemoteSync for Box<T> {
    fn sync_mutation(&self, entry: &SyncEntry) {
        (**self).sync_mutation(entry);
    }

    fn initial_sync(&self, user: &CurrentUser) {
        (**self).initial_sync(user);
    }

    fn tasks(&self) -> &BestEffortTasks {
        (**self).tasks()
    }
}

/// Detached background tasks, tracked only so a short-lived process can give
/// them a bounded grace period before exiting.
#[derive(Debug, Clone, Default)]
pub struct BestEffortTasks {
    inner: Arc<Mutex<JoinSet<()>>>,
}

impl BestEffortTasks {
    /// Spawn `task` on the current runtime without awaiting it.
    ///
    /// Outside a tokio runtime the task is dropped and only logged.
    pub fn spawn<F>(&self, label: &str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(handle) = Handle::try_current() else {
            tracing::debug!("No async runtime; skipped background task '{label}'");
            return;
        };

        let mut set = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        while set.try_join_next().is_some() {}
        set.spawn_on(task, &handle);
    }

    /// Number of tasks not yet reaped
    pub fn pending(&self) -> usize {
        let mut set = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        while set.try_join_next().is_some() {}
        set.len()
    }

    /// Wait up to `grace` for outstanding tasks; returns how many were abandoned
    pub async fn settle(&self, grace: Duration) -> usize {
        let mut set = {
            let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };

        let deadline = tokio::time::Instant::now() + grace;
        while !set.is_empty() {
            match tokio::time::timeout_at(deadline, set.join_next()).await {
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => break,
            }
        }

        let abandoned = set.len();
        if abandoned > 0 {
            tracing::warn!("Abandoning {abandoned} unfinished sync task(s)");
        }
        abandoned
    }
}
