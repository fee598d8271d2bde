//! Sync engine error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by sync engine operations.
///
/// Remote failures never appear here: the engine catches them, logs
/// them, and counts them in the [`SyncSummary`](super::SyncSummary),
/// since the local mutation has already succeeded by the time the
/// remote is contacted. Local persistence failures are fatal because no
/// durable record of the change exists.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No local item with the given global ID.
    #[error("no local item with global ID {0}")]
    NotFound(String),
}
