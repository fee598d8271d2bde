//! Northstar Core Library
//!
//! Shared types and logic for Northstar applications: the synced entity
//! model, local persistence, the remote store contract, the
//! last-write-wins sync engine, and the constellation layout engine.

pub mod envelope;
pub mod layout;
pub mod models;
pub mod remote;
pub mod storage;
pub mod store;
pub mod sync;

pub use envelope::{ObjectType, Payload, SyncEnvelope};
pub use layout::{
    compute_layout, ConstellationLayout, LayoutBounds, LayoutError, WaypointLink,
    WaypointPosition,
};
pub use models::{Quest, Tag, TagType, Waypoint};
pub use remote::{HttpRemote, MemoryRemote, RemoteClient, RemoteError, MAX_BATCH_SIZE};
pub use storage::{LocalStore, StorageError};
pub use store::EntityStore;
pub use sync::{SyncEngine, SyncError, SyncSummary};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
