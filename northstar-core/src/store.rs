//! Per-type entity cache over the remote store.

use std::sync::Arc;

use crate::envelope::{ObjectType, Payload};
use crate::models::{Quest, Tag, TagType, Waypoint};
use crate::remote::{RemoteClient, RemoteError};

/// Cache-or-fetch access to the synced entity collections.
///
/// One explicit `Option<Vec<T>>` per object type: the first access scans
/// the remote store, decodes payloads, and fills the cache in one step
/// (never partially); later accesses return the cached list until the
/// sync engine invalidates the type after a mutation. Concurrent first
/// accesses may fetch twice; the result is identical, so that is
/// tolerated rather than guarded.
#[derive(Debug)]
pub struct EntityStore<R> {
    remote: Arc<R>,
    quests: Option<Vec<Quest>>,
    waypoints: Option<Vec<Waypoint>>,
    tags: Option<Vec<Tag>>,
    tag_types: Option<Vec<TagType>>,
}

impl<R: RemoteClient> EntityStore<R> {
    pub fn new(remote: Arc<R>) -> Self {
        Self {
            remote,
            quests: None,
            waypoints: None,
            tags: None,
            tag_types: None,
        }
    }

    /// All quests, cached after the first fetch.
    pub async fn quests(&mut self) -> Result<Vec<Quest>, RemoteError> {
        if self.quests.is_none() {
            let fetched = self.fetch(ObjectType::Quest, |payload| match payload {
                Payload::Quest(q) => Some(q),
                _ => None,
            })
            .await?;
            self.quests = Some(fetched);
        }
        Ok(self.quests.clone().unwrap_or_default())
    }

    /// All waypoints, cached after the first fetch.
    pub async fn waypoints(&mut self) -> Result<Vec<Waypoint>, RemoteError> {
        if self.waypoints.is_none() {
            let fetched = self.fetch(ObjectType::Waypoint, |payload| match payload {
                Payload::Waypoint(w) => Some(w),
                _ => None,
            })
            .await?;
            self.waypoints = Some(fetched);
        }
        Ok(self.waypoints.clone().unwrap_or_default())
    }

    /// All tags, cached after the first fetch.
    pub async fn tags(&mut self) -> Result<Vec<Tag>, RemoteError> {
        if self.tags.is_none() {
            let fetched = self.fetch(ObjectType::Tag, |payload| match payload {
                Payload::Tag(t) => Some(t),
                _ => None,
            })
            .await?;
            self.tags = Some(fetched);
        }
        Ok(self.tags.clone().unwrap_or_default())
    }

    /// All tag types, cached after the first fetch.
    pub async fn tag_types(&mut self) -> Result<Vec<TagType>, RemoteError> {
        if self.tag_types.is_none() {
            let fetched = self.fetch(ObjectType::TagType, |payload| match payload {
                Payload::TagType(t) => Some(t),
                _ => None,
            })
            .await?;
            self.tag_types = Some(fetched);
        }
        Ok(self.tag_types.clone().unwrap_or_default())
    }

    /// Waypoints belonging to the given quest.
    pub async fn waypoints_for_quest(
        &mut self,
        quest_id: &str,
    ) -> Result<Vec<Waypoint>, RemoteError> {
        let waypoints = self.waypoints().await?;
        Ok(waypoints.into_iter().filter(|w| w.in_quest(quest_id)).collect())
    }

    /// Looks up a single quest by its local ID.
    pub async fn quest_by_id(&mut self, quest_id: &str) -> Result<Option<Quest>, RemoteError> {
        let quests = self.quests().await?;
        Ok(quests.into_iter().find(|q| q.id == quest_id))
    }

    /// Clears the cached list for one object type; the next access
    /// re-fetches from the remote store.
    pub fn invalidate(&mut self, object_type: ObjectType) {
        match object_type {
            ObjectType::Quest => self.quests = None,
            ObjectType::Waypoint => self.waypoints = None,
            ObjectType::Tag => self.tags = None,
            ObjectType::TagType => self.tag_types = None,
        }
    }

    /// Clears every per-type cache. Used after bulk operations.
    pub fn invalidate_all(&mut self) {
        for object_type in ObjectType::ALL {
            self.invalidate(object_type);
        }
    }

    async fn fetch<T>(
        &self,
        object_type: ObjectType,
        decode: fn(Payload) -> Option<T>,
    ) -> Result<Vec<T>, RemoteError> {
        let items = self.remote.scan_by_type(object_type).await?;
        let mut decoded = Vec::with_capacity(items.len());
        for item in items {
            match decode(item.payload) {
                Some(entity) => decoded.push(entity),
                None => {
                    tracing::warn!(
                        global_id = %item.global_id,
                        expected = %object_type,
                        "skipping item with mismatched payload type"
                    );
                }
            }
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::SyncEnvelope;
    use crate::remote::MemoryRemote;

    fn seeded_remote() -> Arc<MemoryRemote> {
        let remote = MemoryRemote::new();

        let mut quest = Quest::new("frontend");
        quest.global_id = "g-quest".into();
        let quest_id = quest.id.clone();
        remote.insert(SyncEnvelope::new(Payload::Quest(quest)));

        let mut wp_in = Waypoint::new("in quest").with_quests(vec![quest_id]);
        wp_in.global_id = "g-wp-1".into();
        remote.insert(SyncEnvelope::new(Payload::Waypoint(wp_in)));

        let mut wp_out = Waypoint::new("elsewhere");
        wp_out.global_id = "g-wp-2".into();
        remote.insert(SyncEnvelope::new(Payload::Waypoint(wp_out)));

        Arc::new(remote)
    }

    #[tokio::test]
    async fn test_get_fetches_once_then_caches() {
        let remote = seeded_remote();
        let mut store = EntityStore::new(remote.clone());

        let first = store.waypoints().await.unwrap();
        let second = store.waypoints().await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(remote.scan_calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let remote = seeded_remote();
        let mut store = EntityStore::new(remote.clone());

        store.waypoints().await.unwrap();
        store.invalidate(ObjectType::Waypoint);
        store.waypoints().await.unwrap();

        assert_eq!(remote.scan_calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_is_per_type() {
        let remote = seeded_remote();
        let mut store = EntityStore::new(remote.clone());

        store.quests().await.unwrap();
        store.waypoints().await.unwrap();
        store.invalidate(ObjectType::Waypoint);

        // Quests stay cached, only waypoints re-fetch.
        store.quests().await.unwrap();
        store.waypoints().await.unwrap();
        assert_eq!(remote.scan_calls(), 3);
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let remote = seeded_remote();
        let mut store = EntityStore::new(remote.clone());

        store.quests().await.unwrap();
        store.waypoints().await.unwrap();
        store.invalidate_all();
        store.quests().await.unwrap();
        store.waypoints().await.unwrap();

        assert_eq!(remote.scan_calls(), 4);
    }

    #[tokio::test]
    async fn test_waypoints_for_quest_filters() {
        let remote = seeded_remote();
        let mut store = EntityStore::new(remote.clone());

        let quest = store.quests().await.unwrap().remove(0);
        let in_quest = store.waypoints_for_quest(&quest.id).await.unwrap();

        assert_eq!(in_quest.len(), 1);
        assert_eq!(in_quest[0].name, "in quest");
    }

    #[tokio::test]
    async fn test_quest_by_id() {
        let remote = seeded_remote();
        let mut store = EntityStore::new(remote.clone());

        let quest = store.quests().await.unwrap().remove(0);
        assert!(store.quest_by_id(&quest.id).await.unwrap().is_some());
        assert!(store.quest_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_and_nothing_cached() {
        let remote = Arc::new(MemoryRemote::new());
        remote.set_unavailable(true);
        let mut store = EntityStore::new(remote.clone());

        assert!(store.waypoints().await.is_err());

        remote.set_unavailable(false);
        // The failed fetch must not have populated the cache.
        store.waypoints().await.unwrap();
        assert_eq!(remote.scan_calls(), 1);
    }
}
