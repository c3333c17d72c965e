//! Local persistence
//!
//! Records live in a handful of fixed keys, each holding a JSON blob. A
//! collection write always replaces the whole blob, so the last write wins and
//! callers own read-modify-write ordering.

mod memory;
mod migrations;
mod sqlite;
#[cfg(test)]
pub(crate) mod testing;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Raw key-value backend behind a [`LocalStore`]
pub trait KeyValueStore {
    /// Read the value stored under `key`
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Record collections kept by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Rotations,
    Notes,
    SyncQueue,
}

impl Collection {
    /// Storage key of this collection
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Rotations => "medrotate_rotations",
            Self::Notes => "medrotate_notes",
            Self::SyncQueue => "medrotate_sync_queue",
        }
    }
}

/// Single-record slots kept by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Singleton {
    CurrentUser,
}

impl Singleton {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::CurrentUser => "medrotate_user",
        }
    }
}

/// Typed access to collections and singletons over a [`KeyValueStore`]
#[derive(Debug)]
pub struct LocalStore<S> {
    backend: S,
}

impl<S: KeyValueStore> LocalStore<S> {
    pub const fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Borrow the raw backend
    pub const fn backend(&self) -> &S {
        &self.backend
    }

    /// Whether the collection has ever been written (and not cleared)
    pub fn contains(&self, collection: Collection) -> Result<bool> {
        Ok(self.backend.read(collection.key())?.is_some())
    }

    /// Load a collection; a missing key reads as empty
    pub fn get<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        match self.backend.read(collection.key())? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrite a whole collection
    pub fn put<T: Serialize>(&self, collection: Collection, records: &[T]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.backend.write(collection.key(), &raw)
    }

    /// Drop a collection entirely
    pub fn clear(&self, collection: Collection) -> Result<()> {
        self.backend.remove(collection.key())
    }

    pub fn get_singleton<T: DeserializeOwned>(&self, slot: Singleton) -> Result<Option<T>> {
        self.backend
            .read(slot.key())?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(Into::into)
    }

    pub fn set_singleton<T: Serialize>(&self, slot: Singleton, record: &T) -> Result<()> {
        let raw = serde_json::to_string(record)?;
        self.backend.write(slot.key(), &raw)
    }

    pub fn clear_singleton(&self, slot: Singleton) -> Result<()> {
        self.backend.remove(slot.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrentUser, Rotation};
    use pretty_assertions::assert_eq;

    fn setup() -> LocalStore<MemoryStore> {
        LocalStore::new(MemoryStore::default())
    }

    #[test]
    fn missing_collection_reads_empty() {
        let store = setup();
        let rotations: Vec<Rotation> = store.get(Collection::Rotations).unwrap();
        assert!(rotations.is_empty());
        assert!(!store.contains(Collection::Rotations).unwrap());
    }

    #[test]
    fn put_overwrites_whole_collection() {
        let store = setup();
        let first = vec![Rotation::new("A", "heart", true), Rotation::new("B", "brain", true)];
        store.put(Collection::Rotations, &first).unwrap();

        let second = vec![Rotation::new("C", "baby", false)];
        store.put(Collection::Rotations, &second).unwrap();

        let loaded: Vec<Rotation> = store.get(Collection::Rotations).unwrap();
        assert_eq!(loaded, second);
    }

    #[test]
    fn singleton_roundtrip_and_clear() {
        let store = setup();
        assert!(store
            .get_singleton::<CurrentUser>(Singleton::CurrentUser)
            .unwrap()
            .is_none());

        let user = CurrentUser::from_email("a@b.c");
        store.set_singleton(Singleton::CurrentUser, &user).unwrap();
        assert_eq!(
            store.get_singleton::<CurrentUser>(Singleton::CurrentUser).unwrap(),
            Some(user)
        );

        store.clear_singleton(Singleton::CurrentUser).unwrap();
        assert!(store
            .get_singleton::<CurrentUser>(Singleton::CurrentUser)
            .unwrap()
            .is_none());
    }

    #[test]
    fn corrupt_blob_is_a_serialization_error() {
        let store = setup();
        store.backend().write(Collection::Notes.key(), "{not json").unwrap();
        let result = store.get::<crate::models::Note>(Collection::Notes);
        assert!(matches!(result, Err(crate::Error::Serialization(_))));
    }
}
