//! File-backed implementation of the `SnapshotStore` trait.
//!
//! Layout: one `SaveSlot_<index>.json` per slot inside the save directory.
//! Writes go to `SaveSlot_<index>.json.tmp` first and are renamed over the
//! canonical file, so a crash mid-write never leaves a torn snapshot behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use tableau_core::error::PersistenceError;
use tableau_core::slot::SlotId;
use tableau_core::snapshot::SessionSnapshot;
use tableau_core::store::SnapshotStore;

const TEMP_SUFFIX: &str = ".tmp";

/// Save slots stored as JSON files in one directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    root: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store rooted at `root` without touching the filesystem.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the save directory if needed and removes temp files left
    /// behind by interrupted writes.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the directory cannot be created or listed.
    pub async fn open(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let store = Self::new(root);
        fs::create_dir_all(&store.root).await?;
        store.sweep_stale_temp_files().await?;
        Ok(store)
    }

    /// The save directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical file for `slot`.
    #[must_use]
    pub fn slot_path(&self, slot: SlotId) -> PathBuf {
        self.root.join(format!("SaveSlot_{}.json", slot.index()))
    }

    fn temp_path(&self, slot: SlotId) -> PathBuf {
        self.root
            .join(format!("SaveSlot_{}.json{TEMP_SUFFIX}", slot.index()))
    }

    async fn sweep_stale_temp_files(&self) -> std::io::Result<()> {
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_stale_temp = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("SaveSlot_") && name.ends_with(TEMP_SUFFIX));
            if !is_stale_temp {
                continue;
            }
            warn!(path = %path.display(), "removing temp file left by an interrupted save");
            if let Err(e) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "could not remove stale temp file");
            }
        }
        Ok(())
    }

    async fn write_atomic(&self, slot: SlotId, contents: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await?;
        let tmp_path = self.temp_path(slot);
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(contents.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp_path, self.slot_path(slot)).await
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn exists(&self, slot: SlotId) -> bool {
        fs::try_exists(self.slot_path(slot)).await.unwrap_or(false)
    }

    async fn write(
        &self,
        slot: SlotId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), PersistenceError> {
        debug!(%slot, context = %snapshot.context_name, "writing snapshot");
        let contents = snapshot
            .to_json()
            .map_err(|e| PersistenceError::WriteFailed {
                slot,
                source: std::io::Error::other(e),
            })?;
        self.write_atomic(slot, &contents)
            .await
            .map_err(|source| PersistenceError::WriteFailed { slot, source })
    }

    async fn read(&self, slot: SlotId) -> Result<SessionSnapshot, PersistenceError> {
        let path = self.slot_path(slot);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PersistenceError::NotFound(slot));
            }
            Err(e) => {
                return Err(PersistenceError::Corrupt {
                    slot,
                    reason: format!("unreadable: {e}"),
                });
            }
        };
        let snapshot = SessionSnapshot::from_json(&contents)
            .map_err(|reason| PersistenceError::Corrupt { slot, reason })?;
        debug!(%slot, context = %snapshot.context_name, "snapshot read");
        Ok(snapshot)
    }

    async fn delete(&self, slot: SlotId) -> Result<(), PersistenceError> {
        match fs::remove_file(self.slot_path(slot)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::WriteFailed { slot, source }),
        }
    }
}
