//! Offline mutation queue
//!
//! Mutations made while offline are appended here and persisted. On reconnect
//! the whole queue is replayed in order through the remote, cleared, and every
//! local record is marked synced. The remote's answers are never consulted:
//! the policy is one attempt per entry, then an optimistic mark-synced.

use crate::error::Result;
use crate::models::{Note, Rotation, SyncEntry};
use crate::remote::RemoteSync;
use crate::store::{Collection, KeyValueStore, LocalStore};

/// What a drain did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Entries handed to the remote
    pub dispatched: usize,
    /// Rotations flipped to synced
    pub rotations_marked: usize,
    /// Notes flipped to synced
    pub notes_marked: usize,
}

/// FIFO of pending mutations mirrored to the local store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncQueue {
    entries: Vec<SyncEntry>,
}

impl SyncQueue {
    /// Load the persisted queue; a missing key is an empty queue
    pub fn load<S: KeyValueStore>(store: &LocalStore<S>) -> Result<Self> {
        let entries = store.get(Collection::SyncQueue)?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pending entries, oldest first
    pub fn entries(&self) -> &[SyncEntry] {
        &self.entries
    }

    /// Append an entry and persist the whole queue
    pub fn enqueue<S: KeyValueStore>(
        &mut self,
        store: &LocalStore<S>,
        entry: SyncEntry,
    ) -> Result<()> {
        tracing::debug!(
            record_id = entry.record_id(),
            "Queued {} while offline",
            entry.kind()
        );
        self.entries.push(entry);
        store.put(Collection::SyncQueue, &self.entries)
    }

    /// Replay every entry through `remote`, clear the queue, and mark all
    /// rotations and notes synced regardless of remote outcome.
    pub fn drain_all<S: KeyValueStore, R: RemoteSync + ?Sized>(
        &mut self,
        store: &LocalStore<S>,
        remote: &R,
    ) -> Result<DrainReport> {
        for entry in &self.entries {
            remote.sync_mutation(entry);
        }
        store.clear(Collection::SyncQueue)?;
        let dispatched = self.entries.len();
        self.entries.clear();

        let mut notes: Vec<Note> = store.get(Collection::Notes)?;
        let notes_marked = mark_synced(notes.iter_mut().map(|note| &mut note.synced));
        if notes_marked > 0 {
            store.put(Collection::Notes, &notes)?;
        }

        let mut rotations: Vec<Rotation> = store.get(Collection::Rotations)?;
        let rotations_marked =
            mark_synced(rotations.iter_mut().map(|rotation| &mut rotation.synced));
        if rotations_marked > 0 {
            store.put(Collection::Rotations, &rotations)?;
        }

        let report = DrainReport {
            dispatched,
            rotations_marked,
            notes_marked,
        };
        tracing::info!(
            "Drained sync queue: {} dispatched, {} rotation(s) and {} note(s) marked synced",
            report.dispatched,
            report.rotations_marked,
            report.notes_marked
        );
        Ok(report)
    }
}

fn mark_synced<'a>(flags: impl Iterator<Item = &'a mut bool>) -> usize {
    let mut marked = 0;
    for synced in flags {
        if !*synced {
            *synced = true;
            marked += 1;
        }
    }
    marked
}
