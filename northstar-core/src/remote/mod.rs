//! Remote store contract and adapters.
//!
//! The sync engine talks to any keyed store that supports get/put/delete
//! by global ID, scan-by-type, and bounded batch writes. [`HttpRemote`]
//! implements the contract against an HTTP item store; [`MemoryRemote`]
//! backs tests and offline runs.

mod http;
mod memory;

pub use http::HttpRemote;
pub use memory::MemoryRemote;

use thiserror::Error;

use crate::envelope::{ObjectType, SyncEnvelope};

/// Maximum number of items per underlying batch write call.
pub const MAX_BATCH_SIZE: usize = 25;

/// Errors surfaced by remote store operations.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network or remote-store failure. Tolerated (logged and counted)
    /// at the sync engine boundary.
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    #[error("remote returned status {0}: {1}")]
    Status(u16, String),

    #[error("failed to decode remote response: {0}")]
    Decode(String),

    /// A batch chunk failed after `written` items were already stored.
    /// Chunks already written are not rolled back.
    #[error("batch put failed after {written} item(s): {source}")]
    BatchPartial {
        written: usize,
        #[source]
        source: Box<RemoteError>,
    },
}

/// Contract the sync engine requires of a remote store.
///
/// `batch_put` must chunk internally at [`MAX_BATCH_SIZE`] items and
/// issue multiple underlying calls transparently; a failed chunk aborts
/// the remaining chunks without undoing those already written.
#[allow(async_fn_in_trait)]
pub trait RemoteClient {
    async fn put_one(&self, item: &SyncEnvelope) -> Result<(), RemoteError>;

    /// Looks up one item; absence is `Ok(None)`, never an error.
    async fn get_one(&self, global_id: &str) -> Result<Option<SyncEnvelope>, RemoteError>;

    async fn delete_one(&self, global_id: &str) -> Result<(), RemoteError>;

    async fn scan_by_type(&self, object_type: ObjectType)
        -> Result<Vec<SyncEnvelope>, RemoteError>;

    /// Full-table scan, used by administrative tooling.
    async fn scan_all(&self) -> Result<Vec<SyncEnvelope>, RemoteError>;

    async fn batch_put(&self, items: &[SyncEnvelope]) -> Result<(), RemoteError>;
}
