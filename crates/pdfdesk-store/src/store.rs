//! Durable local-disk artifact store

use crate::error::StorageError;
use crate::owner::OwnerId;
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::NamedTempFile;

/// Reference to one persisted artifact.
///
/// Created at the moment bytes hit the disk and immutable afterwards;
/// a new operation always yields a new reference, never an overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReference {
    pub owner_id: String,
    pub file_name: String,
    pub absolute_path: PathBuf,
}

/// Writes artifacts under `{root}/{owner}/{unique_prefix}-{name}`.
///
/// The unique prefix is `{unix_millis}-{seq}` where `seq` comes from a
/// process-wide counter, so two saves can never collide on a path even
/// within the same millisecond. A bare wall-clock prefix would race under
/// concurrency.
#[derive(Debug)]
pub struct ArtifactStore {
    root: PathBuf,
    sequence: AtomicU64,
}

impl ArtifactStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let root = root.canonicalize()?;
        Ok(Self {
            root,
            sequence: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `bytes` for `owner` under a fresh collision-free name.
    ///
    /// The blob is staged in a temp file in the owner's directory and
    /// renamed into place, so a reader can never observe a partial
    /// artifact. "Directory already exists" is not an error.
    pub fn save(
        &self,
        bytes: &[u8],
        suggested_name: &str,
        owner: &OwnerId,
    ) -> Result<ArtifactReference, StorageError> {
        let dir = self.root.join(owner.as_str());
        fs::create_dir_all(&dir)?;

        let prefix = self.next_prefix();
        let file_name = format!("{prefix}-{suggested_name}");
        let path = dir.join(&file_name);

        let mut staged = NamedTempFile::new_in(&dir)?;
        staged.write_all(bytes)?;
        staged.persist(&path).map_err(|e| StorageError::Io(e.error))?;

        tracing::debug!(
            owner = %owner,
            file = %file_name,
            size = bytes.len(),
            "artifact persisted"
        );

        Ok(ArtifactReference {
            owner_id: owner.as_str().to_string(),
            file_name,
            absolute_path: path,
        })
    }

    fn next_prefix(&self) -> String {
        let millis = Utc::now().timestamp_millis();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{millis}-{seq}")
    }
}
