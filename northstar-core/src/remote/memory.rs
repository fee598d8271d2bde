//! In-memory remote store for tests and offline runs.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{RemoteClient, RemoteError, MAX_BATCH_SIZE};
use crate::envelope::{ObjectType, SyncEnvelope};

/// A [`RemoteClient`] over an in-process table.
///
/// Chunks batch writes exactly like a real adapter and counts scan and
/// batch calls, so tests can assert on push traffic. `set_unavailable`
/// makes every operation fail, simulating an unreachable remote;
/// `fail_after_batch_calls` lets the remote drop mid-batch.
#[derive(Debug)]
pub struct MemoryRemote {
    items: Mutex<BTreeMap<String, SyncEnvelope>>,
    scan_calls: AtomicUsize,
    batch_calls: AtomicUsize,
    batch_fail_after: AtomicUsize,
    unavailable: AtomicBool,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            scan_calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
            batch_fail_after: AtomicUsize::new(usize::MAX),
            unavailable: AtomicBool::new(false),
        }
    }

    /// When set, every operation fails with [`RemoteError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes every batch chunk after the first `calls` underlying writes
    /// fail, simulating a remote that goes down mid-batch.
    pub fn fail_after_batch_calls(&self, calls: usize) {
        self.batch_fail_after.store(calls, Ordering::SeqCst);
    }

    /// Number of underlying batch write calls issued so far.
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Number of scans issued so far.
    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores an item directly, bypassing availability checks. Test setup.
    pub fn insert(&self, item: SyncEnvelope) {
        self.items
            .lock()
            .unwrap()
            .insert(item.global_id.clone(), item);
    }

    fn check_available(&self) -> Result<(), RemoteError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RemoteError::Unavailable("remote marked unavailable".into()))
        } else {
            Ok(())
        }
    }

    fn check_batch_available(&self) -> Result<(), RemoteError> {
        self.check_available()?;
        if self.batch_calls.load(Ordering::SeqCst) >= self.batch_fail_after.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("remote dropped mid-batch".into()));
        }
        Ok(())
    }
}

impl RemoteClient for MemoryRemote {
    async fn put_one(&self, item: &SyncEnvelope) -> Result<(), RemoteError> {
        self.check_available()?;
        self.insert(item.clone());
        Ok(())
    }

    async fn get_one(&self, global_id: &str) -> Result<Option<SyncEnvelope>, RemoteError> {
        self.check_available()?;
        Ok(self.items.lock().unwrap().get(global_id).cloned())
    }

    async fn delete_one(&self, global_id: &str) -> Result<(), RemoteError> {
        self.check_available()?;
        self.items.lock().unwrap().remove(global_id);
        Ok(())
    }

    async fn scan_by_type(
        &self,
        object_type: ObjectType,
    ) -> Result<Vec<SyncEnvelope>, RemoteError> {
        self.check_available()?;
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .items
            .lock()
            .unwrap()
            .values()
            .filter(|item| item.object_type() == object_type)
            .cloned()
            .collect())
    }

    async fn scan_all(&self) -> Result<Vec<SyncEnvelope>, RemoteError> {
        self.check_available()?;
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.lock().unwrap().values().cloned().collect())
    }

    async fn batch_put(&self, items: &[SyncEnvelope]) -> Result<(), RemoteError> {
        let mut written = 0;

        for chunk in items.chunks(MAX_BATCH_SIZE) {
            if let Err(e) = self.check_batch_available() {
                return Err(RemoteError::BatchPartial {
                    written,
                    source: Box::new(e),
                });
            }
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            let mut table = self.items.lock().unwrap();
            for item in chunk {
                table.insert(item.global_id.clone(), item.clone());
            }
            written += chunk.len();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Payload;
    use crate::models::Waypoint;

    fn waypoint_envelope(global_id: &str) -> SyncEnvelope {
        let mut wp = Waypoint::new(format!("wp {}", global_id));
        wp.global_id = global_id.into();
        SyncEnvelope::new(Payload::Waypoint(wp))
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let remote = MemoryRemote::new();
        let item = waypoint_envelope("g-1");

        remote.put_one(&item).await.unwrap();
        assert_eq!(remote.get_one("g-1").await.unwrap(), Some(item));

        remote.delete_one("g-1").await.unwrap();
        assert_eq!(remote.get_one("g-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_absent_is_none_not_error() {
        let remote = MemoryRemote::new();
        assert!(remote.get_one("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_batch_put_chunks_at_limit() {
        let remote = MemoryRemote::new();
        let items: Vec<_> = (0..60).map(|i| waypoint_envelope(&format!("g-{i}"))).collect();

        remote.batch_put(&items).await.unwrap();

        // 60 items -> 25 + 25 + 10
        assert_eq!(remote.batch_calls(), 3);
        assert_eq!(remote.len(), 60);
    }

    #[tokio::test]
    async fn test_unavailable_fails_operations() {
        let remote = MemoryRemote::new();
        remote.set_unavailable(true);

        let item = waypoint_envelope("g-1");
        assert!(matches!(
            remote.put_one(&item).await,
            Err(RemoteError::Unavailable(_))
        ));
        assert!(matches!(
            remote.scan_by_type(ObjectType::Waypoint).await,
            Err(RemoteError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_batch_put_unavailable_reports_partial() {
        let remote = MemoryRemote::new();
        remote.set_unavailable(true);

        let items: Vec<_> = (0..3).map(|i| waypoint_envelope(&format!("g-{i}"))).collect();
        match remote.batch_put(&items).await {
            Err(RemoteError::BatchPartial { written, .. }) => assert_eq!(written, 0),
            other => panic!("expected batch partial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_batch_put_second_chunk_failure_keeps_first_chunk() {
        let remote = MemoryRemote::new();
        remote.fail_after_batch_calls(1);

        let items: Vec<_> = (0..30).map(|i| waypoint_envelope(&format!("g-{i}"))).collect();
        match remote.batch_put(&items).await {
            Err(RemoteError::BatchPartial { written, .. }) => assert_eq!(written, 25),
            other => panic!("expected batch partial, got {:?}", other),
        }

        // The first full chunk was written and stays written.
        assert_eq!(remote.batch_calls(), 1);
        assert_eq!(remote.len(), 25);
        for i in 0..25 {
            assert!(remote.get_one(&format!("g-{i}")).await.unwrap().is_some());
        }
        assert!(remote.get_one("g-29").await.unwrap().is_none());
    }
}
