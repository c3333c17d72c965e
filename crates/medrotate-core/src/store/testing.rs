//! Backend that can be told to fail writes or removals

use std::cell::Cell;

use super::{KeyValueStore, MemoryStore};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_writes: Cell<bool>,
    fail_removes: Cell<bool>,
}

impl FailingStore {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.set(fail);
    }
}

impl KeyValueStore for FailingStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.get() {
            return Err(Error::InvalidInput(format!("write to {key} rejected")));
        }
        self.inner.write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        if self.fail_removes.get() {
            return Err(Error::InvalidInput(format!("remove of {key} rejected")));
        }
        self.inner.remove(key)
    }
}
