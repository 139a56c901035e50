use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::{Entry, EntryFields};

use super::EntryStore;

/// Entry store that keeps everything in process memory. Used by the test suite
/// and by `--in-memory` sessions; entries vanish when the process exits.
#[derive(Debug, Default)]
pub struct MemoryEntryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<i64, Entry>,
    last_id: i64,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the map half-written, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EntryStore for MemoryEntryStore {
    type Error = Infallible;

    async fn add(&self, fields: EntryFields) -> Result<Entry, Infallible> {
        let mut inner = self.lock();
        inner.last_id += 1;
        let entry = Entry {
            id: inner.last_id,
            fields,
        };
        inner.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn get_all(&self) -> Result<Vec<Entry>, Infallible> {
        Ok(self.lock().entries.values().cloned().collect())
    }

    async fn delete(&self, id: i64) -> Result<(), Infallible> {
        self.lock().entries.remove(&id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), Infallible> {
        self.lock().entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> EntryFields {
        EntryFields {
            name: name.into(),
            ..EntryFields::default()
        }
    }

    #[tokio::test]
    async fn assigns_monotonic_ids_across_clear() {
        let store = MemoryEntryStore::new();
        let a = store.add(named("a")).await.unwrap();
        let b = store.add(named("b")).await.unwrap();
        store.clear().await.unwrap();
        let c = store.add(named("c")).await.unwrap();

        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
        assert_eq!(store.get_all().await.unwrap(), vec![c]);
    }

    #[tokio::test]
    async fn returns_entries_in_id_order() {
        let store = MemoryEntryStore::new();
        for name in ["x", "y", "z"] {
            store.add(named(name)).await.unwrap();
        }
        store.delete(2).await.unwrap();
        store.delete(42).await.unwrap();

        let ids: Vec<i64> = store
            .get_all()
            .await
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
