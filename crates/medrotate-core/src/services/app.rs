//! Application controller: the single owner of all application state.
//!
//! Every domain operation writes through to the local store first, then
//! either queues itself (offline) or notifies the remote (online). The view
//! layer drives the controller and re-renders from its accessors.

use std::time::Duration;

use crate::connectivity::{Connectivity, ConnectivityMonitor, ConnectivityProbe, Transition};
use crate::error::{Error, Result};
use crate::models::{
    sort_newest_first, CurrentUser, DefaultRotationSet, Note, NoteId, Rotation, RotationId,
    SyncEntry,
};
use crate::remote::RemoteSync;
use crate::store::{Collection, KeyValueStore, LocalStore, Singleton};
use crate::sync::{DrainReport, SyncQueue};

/// Startup parameters for [`App::open`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppOptions {
    /// Set used to seed a store without rotations
    pub default_rotations: DefaultRotationSet,
    /// Platform connectivity sampled at startup
    pub connectivity: Connectivity,
}

/// Result of feeding a connectivity signal into the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityUpdate {
    pub transition: Transition,
    /// Present when the signal caused a queue drain
    pub drained: Option<DrainReport>,
}

/// In-memory working set owned by the controller
#[derive(Debug, Clone)]
struct AppState {
    current_user: Option<CurrentUser>,
    rotations: Vec<Rotation>,
    active_rotation: Option<RotationId>,
    /// Notes of the active rotation, in store order
    notes: Vec<Note>,
    monitor: ConnectivityMonitor,
    sync_queue: SyncQueue,
}

/// The application controller
pub struct App<S, R> {
    store: LocalStore<S>,
    remote: R,
    default_rotations: DefaultRotationSet,
    state: AppState,
}

impl<S: KeyValueStore, R: RemoteSync> App<S, R> {
    /// Restore state from `store` and apply the startup connectivity signal.
    ///
    /// Loads the signed-in user, loads (or seeds) rotations and selects the
    /// first one, reloads the persisted sync queue, then drains it if the
    /// startup state is online.
    pub fn open(store: LocalStore<S>, remote: R, options: AppOptions) -> Result<Self> {
        let current_user = store.get_singleton(Singleton::CurrentUser)?;
        let sync_queue = SyncQueue::load(&store)?;

        let mut app = Self {
            store,
            remote,
            default_rotations: options.default_rotations,
            state: AppState {
                current_user,
                rotations: Vec::new(),
                active_rotation: None,
                notes: Vec::new(),
                monitor: ConnectivityMonitor::new(options.connectivity),
                sync_queue,
            },
        };

        app.load_rotations()?;
        app.set_connectivity(options.connectivity)?;

        if let Some(user) = &app.state.current_user {
            app.remote.initial_sync(user);
        }

        Ok(app)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub const fn current_user(&self) -> Option<&CurrentUser> {
        self.state.current_user.as_ref()
    }

    pub fn rotations(&self) -> &[Rotation] {
        &self.state.rotations
    }

    pub fn active_rotation(&self) -> Option<&Rotation> {
        let id = self.state.active_rotation.as_ref()?;
        self.state.rotations.iter().find(|rotation| &rotation.id == id)
    }

    /// Notes of the active rotation in store order
    pub fn notes(&self) -> &[Note] {
        &self.state.notes
    }

    /// Notes of the active rotation, newest first
    pub fn notes_newest_first(&self) -> Vec<Note> {
        let mut notes = self.state.notes.clone();
        sort_newest_first(&mut notes);
        notes
    }

    pub const fn connectivity(&self) -> Connectivity {
        self.state.monitor.state()
    }

    pub const fn offline_indicator_visible(&self) -> bool {
        self.state.monitor.offline_indicator_visible()
    }

    pub const fn sync_queue(&self) -> &SyncQueue {
        &self.state.sync_queue
    }

    pub const fn store(&self) -> &LocalStore<S> {
        &self.store
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    // ------------------------------------------------------------------
    // Rotations
    // ------------------------------------------------------------------

    /// Load persisted rotations, seeding the default set when none exist.
    ///
    /// Keeps the active rotation if it still exists; otherwise selects the first.
    pub fn load_rotations(&mut self) -> Result<&[Rotation]> {
        let mut rotations: Vec<Rotation> = self.store.get(Collection::Rotations)?;
        if rotations.is_empty() {
            rotations = self
                .default_rotations
                .rotations(self.connectivity().is_online());
            self.store.put(Collection::Rotations, &rotations)?;
            tracing::info!(
                "Seeded {} default rotation(s) ({:?})",
                rotations.len(),
                self.default_rotations
            );
        }
        self.state.rotations = rotations;

        let active_exists = self
            .state
            .active_rotation
            .as_ref()
            .is_some_and(|id| self.state.rotations.iter().any(|r| &r.id == id));
        if !active_exists {
            self.state.active_rotation = self.state.rotations.first().map(|r| r.id.clone());
        }
        self.reload_notes()?;

        Ok(&self.state.rotations)
    }

    /// Select a rotation and load its notes.
    ///
    /// An unknown id leaves the selection unchanged and returns `None`.
    pub fn set_active_rotation(&mut self, id: &RotationId) -> Result<Option<&Rotation>> {
        if !self.state.rotations.iter().any(|rotation| &rotation.id == id) {
            tracing::debug!("Ignoring selection of unknown rotation {id}");
            return Ok(None);
        }

        self.state.active_rotation = Some(id.clone());
        self.reload_notes()?;
        Ok(self.active_rotation())
    }

    /// Create a rotation and make it active
    pub fn create_rotation(&mut self, name: &str, icon: &str) -> Result<Rotation> {
        let rotation = Rotation::new(name, icon, self.connectivity().is_online());

        let mut rotations = self.state.rotations.clone();
        rotations.push(rotation.clone());
        self.store.put(Collection::Rotations, &rotations)?;
        self.state.rotations = rotations;

        self.propagate(SyncEntry::CreateRotation(rotation.clone()))?;

        self.state.active_rotation = Some(rotation.id.clone());
        self.reload_notes()?;

        tracing::debug!("Created rotation {} ({})", rotation.name, rotation.id);
        Ok(rotation)
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    /// Re-read the active rotation's notes from the store
    pub fn reload_notes(&mut self) -> Result<()> {
        self.state.notes = match &self.state.active_rotation {
            Some(active) => self
                .store
                .get::<Note>(Collection::Notes)?
                .into_iter()
                .filter(|note| &note.rotation_id == active)
                .collect(),
            None => Vec::new(),
        };
        Ok(())
    }

    /// Create a note in the active rotation. Empty title/content are accepted.
    pub fn create_note(&mut self, title: &str, content: &str) -> Result<Note> {
        let rotation_id = self
            .state
            .active_rotation
            .clone()
            .ok_or(Error::NoActiveRotation)?;
        let note = Note::new(rotation_id, title, content, self.connectivity().is_online());

        let mut all_notes: Vec<Note> = self.store.get(Collection::Notes)?;
        all_notes.push(note.clone());
        self.store.put(Collection::Notes, &all_notes)?;
        self.state.notes.push(note.clone());

        self.propagate(SyncEntry::CreateNote(note.clone()))?;

        tracing::debug!("Created note {}", note.id);
        Ok(note)
    }

    /// Overwrite a note's title and content.
    ///
    /// Only notes of the active rotation are visible; an unknown id is a
    /// silent no-op returning `None`.
    pub fn update_note(&mut self, id: &NoteId, title: &str, content: &str) -> Result<Option<Note>> {
        let online = self.connectivity().is_online();
        let Some(position) = self.state.notes.iter().position(|note| &note.id == id) else {
            tracing::debug!("Ignoring update of unknown note {id}");
            return Ok(None);
        };
        let mut updated = self.state.notes[position].clone();
        updated.revise(title, content, online);

        let mut all_notes: Vec<Note> = self.store.get(Collection::Notes)?;
        if let Some(stored) = all_notes.iter_mut().find(|note| &note.id == id) {
            *stored = updated.clone();
            self.store.put(Collection::Notes, &all_notes)?;
        }
        self.state.notes[position] = updated.clone();

        self.propagate(SyncEntry::UpdateNote(updated.clone()))?;

        tracing::debug!("Updated note {id}");
        Ok(Some(updated))
    }

    /// Delete a note of the active rotation.
    ///
    /// Returns `false`, touching nothing, when the id is unknown.
    pub fn delete_note(&mut self, id: &NoteId) -> Result<bool> {
        if !self.state.notes.iter().any(|note| &note.id == id) {
            tracing::debug!("Ignoring delete of unknown note {id}");
            return Ok(false);
        }

        let mut all_notes: Vec<Note> = self.store.get(Collection::Notes)?;
        all_notes.retain(|note| &note.id != id);
        self.store.put(Collection::Notes, &all_notes)?;
        self.state.notes.retain(|note| &note.id != id);

        self.propagate(SyncEntry::delete_note(id.clone()))?;

        tracing::debug!("Deleted note {id}");
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Current user
    // ------------------------------------------------------------------

    /// Sign in as `email` (no credential check) and reload rotations
    pub fn sign_in(&mut self, email: &str) -> Result<CurrentUser> {
        if email.trim().is_empty() {
            return Err(Error::InvalidInput("email must not be empty".to_string()));
        }

        let user = CurrentUser::from_email(email);
        self.store.set_singleton(Singleton::CurrentUser, &user)?;
        self.state.current_user = Some(user.clone());
        tracing::info!("Signed in as {}", user.email);

        self.load_rotations()?;
        Ok(user)
    }

    pub fn sign_out(&mut self) -> Result<()> {
        self.store.clear_singleton(Singleton::CurrentUser)?;
        if let Some(user) = self.state.current_user.take() {
            tracing::info!("Signed out {}", user.email);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Connectivity and sync
    // ------------------------------------------------------------------

    /// Feed a platform connectivity signal.
    ///
    /// Whenever the resulting state is online and mutations are pending, the
    /// queue is drained and the working set reloaded.
    pub fn set_connectivity(&mut self, signal: Connectivity) -> Result<ConnectivityUpdate> {
        let transition = self.state.monitor.apply(signal);

        let drained = if signal.is_online() && !self.state.sync_queue.is_empty() {
            Some(self.drain_sync_queue()?)
        } else {
            None
        };

        Ok(ConnectivityUpdate {
            transition,
            drained,
        })
    }

    /// Sample `probe` and apply the result
    pub async fn recheck_connectivity<P: ConnectivityProbe>(
        &mut self,
        probe: &P,
    ) -> Result<ConnectivityUpdate> {
        let signal = probe.sample().await;
        self.set_connectivity(signal)
    }

    /// Replay the queue through the remote and mark everything synced
    pub fn drain_sync_queue(&mut self) -> Result<DrainReport> {
        let report = self
            .state
            .sync_queue
            .drain_all(&self.store, &self.remote)?;

        self.state.rotations = self.store.get(Collection::Rotations)?;
        self.reload_notes()?;
        Ok(report)
    }

    /// Give in-flight remote notifications up to `grace` to finish
    pub async fn settle(&self, grace: Duration) -> usize {
        self.remote.tasks().settle(grace).await
    }

    fn propagate(&mut self, entry: SyncEntry) -> Result<()> {
        if self.connectivity().is_offline() {
            self.state.sync_queue.enqueue(&self.store, entry)
        } else {
            self.remote.sync_mutation(&entry);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::FixedProbe;
    use crate::models::OperationKind;
    use crate::remote::testing::RecordingRemote;
    use crate::store::testing::FailingStore;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    type TestApp = App<MemoryStore, RecordingRemote>;

    fn open_with(store: MemoryStore, connectivity: Connectivity) -> TestApp {
        App::open(
            LocalStore::new(store),
            RecordingRemote::default(),
            AppOptions {
                connectivity,
                ..AppOptions::default()
            },
        )
        .unwrap()
    }

    fn online() -> TestApp {
        open_with(MemoryStore::default(), Connectivity::Online)
    }

    fn offline() -> TestApp {
        open_with(MemoryStore::default(), Connectivity::Offline)
    }

    fn stored_notes_for_active(app: &TestApp) -> Vec<Note> {
        let active = app.active_rotation().unwrap().id.clone();
        app.store()
            .get::<Note>(Collection::Notes)
            .unwrap()
            .into_iter()
            .filter(|note| note.rotation_id == active)
            .collect()
    }

    #[test]
    fn empty_store_seeds_defaults_and_selects_first() {
        let app = online();
        let expected = DefaultRotationSet::Regional.rotations(true);

        assert_eq!(app.rotations(), expected.as_slice());
        assert_eq!(app.active_rotation().unwrap().id.as_str(), "medicine");

        let stored: Vec<Rotation> = app.store().get(Collection::Rotations).unwrap();
        assert_eq!(stored, expected);
    }

    #[test]
    fn offline_first_start_seeds_unsynced_rotations() {
        let mut app = offline();

        assert_eq!(app.rotations().len(), 5);
        assert!(app.rotations().iter().all(|r| !r.synced));
        let stored: Vec<Rotation> = app.store().get(Collection::Rotations).unwrap();
        assert!(stored.iter().all(|r| !r.synced));
        assert!(app.sync_queue().is_empty());

        let update = app.set_connectivity(Connectivity::Online).unwrap();
        assert!(update.drained.is_none());
        app.drain_sync_queue().unwrap();
        assert!(app.rotations().iter().all(|r| r.synced));
    }

    #[test]
    fn general_seed_is_configurable() {
        let app = App::open(
            LocalStore::new(MemoryStore::default()),
            RecordingRemote::default(),
            AppOptions {
                default_rotations: DefaultRotationSet::General,
                connectivity: Connectivity::Online,
            },
        )
        .unwrap();
        assert_eq!(app.active_rotation().unwrap().name, "Cardiology");
        assert_eq!(app.rotations().len(), 5);
    }

    #[test]
    fn existing_rotations_are_not_reseeded() {
        let store = LocalStore::new(MemoryStore::default());
        let custom = vec![Rotation::new("Psychiatry", "brain", true)];
        store.put(Collection::Rotations, &custom).unwrap();

        let app = App::open(store, RecordingRemote::default(), AppOptions::default()).unwrap();
        assert_eq!(app.rotations(), custom.as_slice());
    }

    #[test]
    fn write_through_consistency_across_operations() {
        let mut app = online();

        let first = app.create_note("Admission", "Chest pain").unwrap();
        assert_eq!(app.notes(), stored_notes_for_active(&app).as_slice());

        let second = app.create_note("", "").unwrap();
        assert_eq!(app.notes(), stored_notes_for_active(&app).as_slice());

        app.update_note(&first.id, "Admission (rev)", "Resolved").unwrap();
        assert_eq!(app.notes(), stored_notes_for_active(&app).as_slice());

        assert!(app.delete_note(&second.id).unwrap());
        assert_eq!(app.notes(), stored_notes_for_active(&app).as_slice());
        assert_eq!(app.notes().len(), 1);
    }

    #[test]
    fn create_then_update_round_trip() {
        let mut app = online();
        let created = app.create_note("T", "C").unwrap();
        let updated = app.update_note(&created.id, "T2", "C2").unwrap().unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "T2");
        assert_eq!(updated.content, "C2");
        assert!(updated.date >= created.date);
    }

    #[test]
    fn deleting_unknown_note_changes_nothing() {
        let mut app = offline();
        app.create_note("keep", "me").unwrap();
        let notes_before = app.store().backend().read(Collection::Notes.key()).unwrap();
        let queue_before = app.sync_queue().len();

        assert!(!app.delete_note(&NoteId::from("missing")).unwrap());

        let notes_after = app.store().backend().read(Collection::Notes.key()).unwrap();
        assert_eq!(notes_before, notes_after);
        assert_eq!(app.sync_queue().len(), queue_before);
    }

    #[test]
    fn updating_unknown_note_is_a_no_op() {
        let mut app = online();
        assert!(app
            .update_note(&NoteId::from("missing"), "t", "c")
            .unwrap()
            .is_none());
        assert!(app.remote().entries().is_empty());
    }

    #[test]
    fn offline_create_rotation_queues_exactly_one_entry() {
        let mut app = offline();
        let before = app.sync_queue().len();

        let rotation = app.create_rotation("X", "heart").unwrap();

        assert_eq!(app.sync_queue().len(), before + 1);
        let entry = app.sync_queue().entries().last().unwrap();
        assert_eq!(entry.kind(), OperationKind::CreateRotation);
        assert_eq!(entry.record_id(), rotation.id.as_str());
        assert!(!rotation.synced);
        assert_eq!(app.active_rotation().unwrap().id, rotation.id);
        assert!(app.remote().entries().is_empty());
    }

    #[test]
    fn online_mutations_notify_remote_instead_of_queueing() {
        let mut app = online();
        let note = app.create_note("t", "c").unwrap();
        app.update_note(&note.id, "t2", "c2").unwrap();
        app.delete_note(&note.id).unwrap();

        assert!(note.synced);
        assert!(app.sync_queue().is_empty());
        assert_eq!(
            app.remote().kinds(),
            vec![
                OperationKind::CreateNote,
                OperationKind::UpdateNote,
                OperationKind::DeleteNote
            ]
        );
    }

    #[test]
    fn reconnect_drains_queue_and_marks_everything_synced() {
        let mut app = offline();
        let rotation = app.create_rotation("Psychiatry", "brain").unwrap();
        let note = app.create_note("t", "c").unwrap();
        app.update_note(&note.id, "t2", "c2").unwrap();
        assert_eq!(app.sync_queue().len(), 3);
        assert!(app.offline_indicator_visible());

        let update = app.set_connectivity(Connectivity::Online).unwrap();

        assert_eq!(update.transition, Transition::Reconnected);
        assert_eq!(update.drained.unwrap().dispatched, 3);
        assert!(app.sync_queue().is_empty());
        assert!(!app.offline_indicator_visible());
        assert_eq!(
            app.remote().record_ids(),
            vec![
                rotation.id.to_string(),
                note.id.to_string(),
                note.id.to_string()
            ]
        );

        let rotations: Vec<Rotation> = app.store().get(Collection::Rotations).unwrap();
        let notes: Vec<Note> = app.store().get(Collection::Notes).unwrap();
        assert!(rotations.iter().all(|r| r.synced));
        assert!(notes.iter().all(|n| n.synced));
        assert!(app.notes().iter().all(|n| n.synced));
        assert!(app.rotations().iter().all(|r| r.synced));
    }

    #[test]
    fn going_offline_has_no_side_effects() {
        let mut app = online();
        let update = app.set_connectivity(Connectivity::Offline).unwrap();
        assert_eq!(update.transition, Transition::Disconnected);
        assert!(update.drained.is_none());
        assert!(app.remote().entries().is_empty());
    }

    #[test]
    fn persisted_queue_drains_on_online_startup() {
        let store = MemoryStore::default();
        {
            let mut app = open_with(store, Connectivity::Offline);
            app.create_note("queued", "while offline").unwrap();
            assert_eq!(app.sync_queue().len(), 1);

            let App { store, .. } = app;
            let reopened = App::open(
                store,
                RecordingRemote::default(),
                AppOptions::default(),
            )
            .unwrap();

            assert!(reopened.sync_queue().is_empty());
            assert_eq!(reopened.remote().kinds(), vec![OperationKind::CreateNote]);
            assert!(reopened.notes().iter().all(|n| n.synced));
        }
    }

    #[test]
    fn notes_are_filtered_by_rotation() {
        let mut app = online();
        let a = app.active_rotation().unwrap().id.clone();
        let note_a = app.create_note("in A", "").unwrap();

        let b = app.rotations()[1].id.clone();
        app.set_active_rotation(&b).unwrap();
        let note_b = app.create_note("in B", "").unwrap();

        assert!(app.notes().iter().all(|n| n.rotation_id == b));
        assert!(!app.notes().iter().any(|n| n.id == note_a.id));

        app.set_active_rotation(&a).unwrap();
        assert!(app.notes().iter().all(|n| n.rotation_id == a));
        assert!(!app.notes().iter().any(|n| n.id == note_b.id));
    }

    #[test]
    fn unknown_rotation_selection_keeps_current() {
        let mut app = online();
        let current = app.active_rotation().unwrap().id.clone();
        assert!(app
            .set_active_rotation(&RotationId::from("nowhere"))
            .unwrap()
            .is_none());
        assert_eq!(app.active_rotation().unwrap().id, current);
    }

    #[test]
    fn notes_newest_first_orders_by_date() {
        let mut app = online();
        let older = app.create_note("older", "").unwrap();
        let newer = app.create_note("newer", "").unwrap();
        app.state.notes[0].date = older.date - chrono::Duration::minutes(1);

        let ordered = app.notes_newest_first();
        assert_eq!(ordered[0].id, newer.id);
    }

    #[test]
    fn sign_in_and_out_manage_current_user() {
        let mut app = online();
        assert!(app.current_user().is_none());
        assert!(app.sign_in("   ").is_err());

        let user = app.sign_in("resident@clinic.org").unwrap();
        assert_eq!(user.display_name, "resident");
        assert_eq!(
            app.store()
                .get_singleton::<CurrentUser>(Singleton::CurrentUser)
                .unwrap(),
            Some(user)
        );

        app.sign_out().unwrap();
        assert!(app.current_user().is_none());
        assert!(app
            .store()
            .get_singleton::<CurrentUser>(Singleton::CurrentUser)
            .unwrap()
            .is_none());
    }

    #[test]
    fn signed_in_startup_announces_initial_sync() {
        let store = LocalStore::new(MemoryStore::default());
        store
            .set_singleton(Singleton::CurrentUser, &CurrentUser::from_email("a@b.c"))
            .unwrap();
        let app = App::open(store, RecordingRemote::default(), AppOptions::default()).unwrap();
        assert_eq!(app.remote().initial_syncs(), 1);
    }

    #[test]
    fn create_note_without_rotation_is_rejected() {
        let mut app = online();
        app.state.active_rotation = None;
        app.reload_notes().unwrap();
        assert!(matches!(
            app.create_note("t", "c"),
            Err(Error::NoActiveRotation)
        ));
    }

    #[test]
    fn failed_store_writes_leave_working_set_untouched() {
        let mut app = App::open(
            LocalStore::new(FailingStore::default()),
            RecordingRemote::default(),
            AppOptions {
                connectivity: Connectivity::Offline,
                ..AppOptions::default()
            },
        )
        .unwrap();
        let kept = app.create_note("kept", "before failure").unwrap();
        let rotations_before = app.rotations().to_vec();
        let notes_before = app.notes().to_vec();
        let queued_before = app.sync_queue().len();

        app.store().backend().fail_writes(true);

        assert!(app.create_note("lost", "").is_err());
        assert!(app.create_rotation("Psychiatry", "brain").is_err());
        assert!(app.update_note(&kept.id, "changed", "changed").is_err());
        assert!(app.delete_note(&kept.id).is_err());

        assert_eq!(app.rotations(), rotations_before.as_slice());
        assert_eq!(app.notes(), notes_before.as_slice());
        assert_eq!(app.sync_queue().len(), queued_before);

        app.store().backend().fail_writes(false);
        app.reload_notes().unwrap();
        assert_eq!(app.notes(), notes_before.as_slice());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn recheck_uses_probe_signal() {
        let mut app = offline();
        app.create_note("t", "c").unwrap();

        let update = app
            .recheck_connectivity(&FixedProbe(Connectivity::Online))
            .await
            .unwrap();
        assert_eq!(update.transition, Transition::Reconnected);
        assert!(update.drained.is_some());
        assert_eq!(app.connectivity(), Connectivity::Online);
    }
}
