//! Test stores: mock `SnapshotStore` implementations for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tableau_core::error::PersistenceError;
use tableau_core::slot::SlotId;
use tableau_core::snapshot::SessionSnapshot;
use tableau_core::store::SnapshotStore;

/// A snapshot store held in memory that records every write and delete.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    slots: Mutex<BTreeMap<SlotId, SessionSnapshot>>,
    writes: Mutex<Vec<(SlotId, SessionSnapshot)>>,
    deletes: Mutex<Vec<SlotId>>,
}

impl InMemorySnapshotStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with `slot` pre-filled. Seeding is not recorded as a write.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_snapshot(self, slot: SlotId, snapshot: SessionSnapshot) -> Self {
        self.slots.lock().unwrap().insert(slot, snapshot);
        self
    }

    /// Returns a copy of the snapshot currently in `slot`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn snapshot(&self, slot: SlotId) -> Option<SessionSnapshot> {
        self.slots.lock().unwrap().get(&slot).cloned()
    }

    /// Returns every successful write in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn writes(&self) -> Vec<(SlotId, SessionSnapshot)> {
        self.writes.lock().unwrap().clone()
    }

    /// Returns every delete in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn deletes(&self) -> Vec<SlotId> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn exists(&self, slot: SlotId) -> bool {
        self.slots.lock().unwrap().contains_key(&slot)
    }

    async fn write(
        &self,
        slot: SlotId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), PersistenceError> {
        self.slots.lock().unwrap().insert(slot, snapshot.clone());
        self.writes.lock().unwrap().push((slot, snapshot.clone()));
        Ok(())
    }

    async fn read(&self, slot: SlotId) -> Result<SessionSnapshot, PersistenceError> {
        self.slots
            .lock()
            .unwrap()
            .get(&slot)
            .cloned()
            .ok_or(PersistenceError::NotFound(slot))
    }

    async fn delete(&self, slot: SlotId) -> Result<(), PersistenceError> {
        self.slots.lock().unwrap().remove(&slot);
        self.deletes.lock().unwrap().push(slot);
        Ok(())
    }
}

/// A snapshot store whose slots all look full but cannot be read, written
/// or deleted. Useful for testing error-handling paths.
#[derive(Debug)]
pub struct FailingSnapshotStore;

#[async_trait]
impl SnapshotStore for FailingSnapshotStore {
    async fn exists(&self, _slot: SlotId) -> bool {
        true
    }

    async fn write(
        &self,
        slot: SlotId,
        _snapshot: &SessionSnapshot,
    ) -> Result<(), PersistenceError> {
        Err(PersistenceError::WriteFailed {
            slot,
            source: std::io::Error::other("disk full"),
        })
    }

    async fn read(&self, slot: SlotId) -> Result<SessionSnapshot, PersistenceError> {
        Err(PersistenceError::Corrupt {
            slot,
            reason: "unexpected end of file".into(),
        })
    }

    async fn delete(&self, slot: SlotId) -> Result<(), PersistenceError> {
        Err(PersistenceError::WriteFailed {
            slot,
            source: std::io::Error::other("read-only file system"),
        })
    }
}
