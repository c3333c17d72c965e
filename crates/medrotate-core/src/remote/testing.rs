//! Remote double that records what it was asked to sync

use std::cell::{Cell, RefCell};

use super::{BestEffortTasks, RemoteSync};
use crate::models::{CurrentUser, OperationKind, SyncEntry};

#[derive(Debug, Default)]
pub struct RecordingRemote {
    entries: RefCell<Vec<SyncEntry>>,
    initial_syncs: Cell<usize>,
    tasks: BestEffortTasks,
}

impl RecordingRemote {
    pub fn entries(&self) -> Vec<SyncEntry> {
        self.entries.borrow().clone()
    }

    pub fn kinds(&self) -> Vec<OperationKind> {
        self.entries.borrow().iter().map(SyncEntry::kind).collect()
    }

    pub fn record_ids(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .map(|entry| entry.record_id().to_string())
            .collect()
    }

    pub fn initial_syncs(&self) -> usize {
        self.initial_syncs.get()
    }
}

impl RemoteSync for RecordingRemote {
    fn sync_mutation(&self, entry: &SyncEntry) {
        self.entries.borrow_mut().push(entry.clone());
    }

    fn initial_sync(&self, _user: &CurrentUser) {
        self.initial_syncs.set(self.initial_syncs.get() + 1);
    }

    fn tasks(&self) -> &BestEffortTasks {
        &self.tasks
    }
}
