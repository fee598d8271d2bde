//! Local persisted replica: one JSON array of envelopes per object type.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::envelope::{ObjectType, SyncEnvelope};

/// Errors that can occur reading or writing the local replica.
///
/// Unlike remote failures, these are fatal to the caller of a mutation:
/// if the local write failed, no durable record of the change exists.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error for {0}: {1}")]
    Io(PathBuf, #[source] io::Error),

    #[error("failed to parse {0}: {1}")]
    Parse(PathBuf, #[source] serde_json::Error),
}

/// File-backed storage for the local entity collections.
///
/// Each object type persists as a single JSON array of [`SyncEnvelope`]
/// values. Writes replace the whole collection; there is no append log
/// and no transactional guarantee across a read-reconcile-write cycle.
#[derive(Debug, Clone)]
pub struct LocalStore {
    data_dir: PathBuf,
}

impl LocalStore {
    /// Creates a store rooted at the given data directory.
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Returns the full path of the collection file for an object type.
    pub fn path(&self, object_type: ObjectType) -> PathBuf {
        self.data_dir.join(object_type.filename())
    }

    /// Checks whether a collection has ever been persisted.
    pub fn exists(&self, object_type: ObjectType) -> bool {
        self.path(object_type).exists()
    }

    /// Loads the persisted collection for an object type.
    ///
    /// A missing file is an empty collection, not an error.
    pub fn load(&self, object_type: ObjectType) -> Result<Vec<SyncEnvelope>, StorageError> {
        let path = self.path(object_type);

        match fs::read(&path) {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| StorageError::Parse(path, e))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }

    /// Replaces the persisted collection for an object type in one write.
    ///
    /// Creates the data directory if it doesn't exist.
    pub fn save(
        &self,
        object_type: ObjectType,
        items: &[SyncEnvelope],
    ) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StorageError::Io(self.data_dir.clone(), e))?;

        let path = self.path(object_type);
        let bytes = serde_json::to_vec_pretty(items)
            .map_err(|e| StorageError::Parse(path.clone(), e))?;

        fs::write(&path, bytes).map_err(|e| StorageError::Io(path, e))?;

        Ok(())
    }
}
