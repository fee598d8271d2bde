//! Last-write-wins synchronization between the local replica and the
//! remote store.
//!
//! The engine is local-first: every mutation persists locally before the
//! remote is contacted, and any remote failure is logged and counted
//! rather than propagated. Callers must serialize sync operations per
//! object type; the engine holds no cross-call lock.

mod engine;
mod error;

pub use engine::{SyncEngine, SyncSummary};
pub use error::SyncError;
