//! Snapshot store abstraction.

use async_trait::async_trait;

use crate::error::PersistenceError;
use crate::slot::SlotId;
use crate::snapshot::{SessionSnapshot, empty_slot_label};

/// Durable storage holding at most one snapshot per slot.
///
/// Each slot is independent. Implementations must never leave a half-written
/// snapshot where `read` can see it.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Whether the slot currently holds a snapshot.
    async fn exists(&self, slot: SlotId) -> bool;

    /// Replaces the slot's snapshot.
    async fn write(&self, slot: SlotId, snapshot: &SessionSnapshot)
    -> Result<(), PersistenceError>;

    /// Reads the slot's snapshot.
    ///
    /// Fails with `NotFound` for an empty slot and `Corrupt` if the stored
    /// bytes cannot be decoded.
    async fn read(&self, slot: SlotId) -> Result<SessionSnapshot, PersistenceError>;

    /// Empties the slot. Succeeds if it was already empty.
    async fn delete(&self, slot: SlotId) -> Result<(), PersistenceError>;

    /// Human-readable summary of the slot. Never fails: any read error
    /// falls back to the empty label.
    async fn label(&self, slot: SlotId) -> String {
        match self.read(slot).await {
            Ok(snapshot) => snapshot.label(slot),
            Err(_) => empty_slot_label(slot),
        }
    }
}

/// Returns the lowest-numbered empty slot, if any.
pub async fn first_empty_slot(store: &dyn SnapshotStore) -> Option<SlotId> {
    for slot in SlotId::all() {
        if !store.exists(slot).await {
            return Some(slot);
        }
    }
    None
}
