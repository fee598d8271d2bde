use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::error::SyncError;
use crate::envelope::{ObjectType, Payload, SyncEnvelope};
use crate::remote::RemoteClient;
use crate::storage::LocalStore;
use crate::store::EntityStore;

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// IDs present in the union of the local and remote sets.
    pub processed: usize,
    /// IDs present on both sides, regardless of which side won.
    pub conflicts: usize,
    /// Remote-side failures that were caught and logged.
    pub errors: usize,
}

/// Reconciles the local replica and the remote store per object type.
///
/// The engine is the only writer to both local storage and the remote
/// store. Conflict resolution is last-write-wins on `last_modified`,
/// with ties going to the remote copy: only a strictly newer local item
/// overrides the remote. That asymmetry is deliberate: two replicas
/// that stamped the same instant converge on the remote value.
#[derive(Debug)]
pub struct SyncEngine<R> {
    remote: Arc<R>,
    local: LocalStore,
    cache: EntityStore<R>,
}

impl<R: RemoteClient> SyncEngine<R> {
    pub fn new(remote: Arc<R>, local: LocalStore) -> Self {
        let cache = EntityStore::new(remote.clone());
        Self {
            remote,
            local,
            cache,
        }
    }

    /// The entity cache fed by this engine's remote store.
    pub fn cache(&mut self) -> &mut EntityStore<R> {
        &mut self.cache
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// Runs one reconciliation pass for a single object type.
    ///
    /// Local state is persisted before any push is attempted, so a
    /// remote failure never loses local data; it only shows up in
    /// `errors`. A failed remote fetch aborts the pass without touching
    /// local storage.
    pub async fn sync_type(&mut self, object_type: ObjectType) -> Result<SyncSummary, SyncError> {
        let mut summary = SyncSummary::default();

        let local_items = self.local.load(object_type)?;
        let remote_items = match self.remote.scan_by_type(object_type).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(%object_type, error = %e, "remote fetch failed, skipping sync pass");
                summary.errors += 1;
                return Ok(summary);
            }
        };

        let mut local_map: BTreeMap<String, SyncEnvelope> = local_items
            .into_iter()
            .map(|item| (item.global_id.clone(), item))
            .collect();
        let mut remote_map: BTreeMap<String, SyncEnvelope> = remote_items
            .into_iter()
            .map(|item| (item.global_id.clone(), item))
            .collect();

        let ids: Vec<String> = local_map
            .keys()
            .chain(remote_map.keys())
            .cloned()
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut reconciled = Vec::with_capacity(ids.len());
        let mut to_push = Vec::new();

        for id in ids {
            match (local_map.remove(&id), remote_map.remove(&id)) {
                (Some(local), Some(remote)) => {
                    summary.conflicts += 1;
                    if local.last_modified > remote.last_modified {
                        // Local strictly newer: keep it and push.
                        to_push.push(local.clone());
                        reconciled.push(local);
                    } else {
                        // Remote newer or tied: adopt the remote copy.
                        reconciled.push(remote);
                    }
                }
                (Some(local), None) => {
                    // First sync of a locally-created item, or a remote
                    // deletion this engine never observed. The two cases
                    // are indistinguishable without tombstones, so the
                    // item is always re-pushed.
                    to_push.push(local.clone());
                    reconciled.push(local);
                }
                (None, Some(remote)) => reconciled.push(remote),
                (None, None) => unreachable!("id came from the union of both maps"),
            }
            summary.processed += 1;
        }

        // Local-first: the reconciled set is durable before any push.
        self.local.save(object_type, &reconciled)?;
        self.cache.invalidate(object_type);

        if !to_push.is_empty() {
            if let Err(e) = self.remote.batch_put(&to_push).await {
                tracing::warn!(%object_type, error = %e, "remote push failed");
                summary.errors += 1;
            }
        }

        Ok(summary)
    }

    /// Reconciles every object type.
    pub async fn sync_all(&mut self) -> Result<Vec<(ObjectType, SyncSummary)>, SyncError> {
        let mut results = Vec::with_capacity(ObjectType::ALL.len());
        for object_type in ObjectType::ALL {
            let summary = self.sync_type(object_type).await?;
            results.push((object_type, summary));
        }
        Ok(results)
    }

    /// Creates an entity: assigns a global ID if missing, stamps the
    /// modification time, persists locally, then best-effort pushes.
    pub async fn create_and_sync(&mut self, mut payload: Payload) -> Result<SyncEnvelope, SyncError> {
        if payload.global_id().is_empty() {
            payload.set_global_id(Uuid::new_v4().to_string());
        }
        payload.touch(Utc::now());
        let envelope = SyncEnvelope::new(payload);
        let object_type = envelope.object_type();

        let mut items = self.local.load(object_type)?;
        items.push(envelope.clone());
        self.local.save(object_type, &items)?;
        self.cache.invalidate(object_type);

        if let Err(e) = self.remote.put_one(&envelope).await {
            tracing::warn!(
                global_id = %envelope.global_id,
                error = %e,
                "remote put failed, create kept locally"
            );
        }
        Ok(envelope)
    }

    /// Replaces the local item matching the payload's global ID, stamps
    /// the modification time, persists, then best-effort pushes.
    pub async fn update_and_sync(&mut self, mut payload: Payload) -> Result<SyncEnvelope, SyncError> {
        payload.touch(Utc::now());
        let envelope = SyncEnvelope::new(payload);
        let object_type = envelope.object_type();

        let mut items = self.local.load(object_type)?;
        let slot = items
            .iter_mut()
            .find(|item| item.global_id == envelope.global_id)
            .ok_or_else(|| SyncError::NotFound(envelope.global_id.clone()))?;
        *slot = envelope.clone();
        self.local.save(object_type, &items)?;
        self.cache.invalidate(object_type);

        if let Err(e) = self.remote.put_one(&envelope).await {
            tracing::warn!(
                global_id = %envelope.global_id,
                error = %e,
                "remote put failed, update kept locally"
            );
        }
        Ok(envelope)
    }

    /// Removes the item locally, persists, then best-effort deletes
    /// remotely. Local deletion is authoritative even when the remote
    /// call fails; without tombstones a later reconciliation can
    /// resurrect the item if the remote copy was never removed.
    pub async fn delete_and_sync(
        &mut self,
        object_type: ObjectType,
        global_id: &str,
    ) -> Result<(), SyncError> {
        let mut items = self.local.load(object_type)?;
        items.retain(|item| item.global_id != global_id);
        self.local.save(object_type, &items)?;
        self.cache.invalidate(object_type);

        if let Err(e) = self.remote.delete_one(global_id).await {
            tracing::warn!(
                %global_id,
                error = %e,
                "remote delete failed, item removed locally only"
            );
        }
        Ok(())
    }
}
