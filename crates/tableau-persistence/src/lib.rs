//! Tableau Persistence: durable save slots.

pub mod file_snapshot_store;

pub use file_snapshot_store::FileSnapshotStore;
