use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use cafs_types::ObjectId;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

/// In-memory, HashMap-based block store.
///
/// Intended for tests and embedding. Blocks are held behind a `RwLock`
/// for safe concurrent access and addressed by the BLAKE3 hash of their
/// bytes. Methods are `async` only to satisfy the [`BlockStore`] contract;
/// nothing here actually suspends.
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl InMemoryBlockStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blocks.
    pub fn total_bytes(&self) -> u64 {
        self.blocks
            .read()
            .expect("lock poisoned")
            .values()
            .map(|b| b.len() as u64)
            .sum()
    }

    /// Remove all blocks from the store.
    pub fn clear(&self) {
        self.blocks.write().expect("lock poisoned").clear();
    }

    /// Return a sorted list of all block addresses in the store.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let map = self.blocks.read().expect("lock poisoned");
        let mut ids: Vec<ObjectId> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockStore for InMemoryBlockStore {
    async fn put(&self, bytes: Vec<u8>) -> StoreResult<ObjectId> {
        let id = ObjectId::from_bytes(&bytes);
        let mut map = self.blocks.write().expect("lock poisoned");
        // Idempotent: content addressing guarantees the same key always
        // maps to the same bytes, so a repeat write can be skipped.
        if map.insert(id, bytes).is_none() {
            debug!(block = %id.short_hex(), "stored block");
        }
        Ok(id)
    }

    async fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let map = self.blocks.read().expect("lock poisoned");
        map.get(id).cloned().ok_or(StoreError::NotFound(*id))
    }

    async fn has(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    async fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        let mut map = self.blocks.write().expect("lock poisoned");
        Ok(map.remove(id).is_some())
    }
}

impl std::fmt::Debug for InMemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlockStore")
            .field("block_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn put_and_get() {
        let store = InMemoryBlockStore::new();
        let id = store.put(b"hello world".to_vec()).await.unwrap();
        let read_back = store.get(&id).await.unwrap();
        assert_eq!(read_back, b"hello world");
    }

    #[tokio::test]
    async fn get_missing_block_fails() {
        let store = InMemoryBlockStore::new();
        let id = ObjectId::from_bytes(b"never stored");
        let err = store.get(&id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn has_reports_presence() {
        let store = InMemoryBlockStore::new();
        let absent = ObjectId::from_bytes(b"absent");
        assert!(!store.has(&absent).await.unwrap());

        let id = store.put(b"present".to_vec()).await.unwrap();
        assert!(store.has(&id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_present_and_missing() {
        let store = InMemoryBlockStore::new();
        let id = store.put(b"to-delete".to_vec()).await.unwrap();
        assert!(store.delete(&id).await.unwrap()); // was present
        assert!(!store.has(&id).await.unwrap()); // now gone
        assert!(!store.delete(&id).await.unwrap()); // second delete = false
    }

    // -----------------------------------------------------------------------
    // Content-addressing correctness
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn same_bytes_same_address() {
        let store = InMemoryBlockStore::new();
        let id1 = store.put(b"identical".to_vec()).await.unwrap();
        let id2 = store.put(b"identical".to_vec()).await.unwrap();
        assert_eq!(id1, id2);
        // Only one block stored (dedup).
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn different_bytes_different_address() {
        let store = InMemoryBlockStore::new();
        let id1 = store.put(b"aaa".to_vec()).await.unwrap();
        let id2 = store.put(b"bbb".to_vec()).await.unwrap();
        assert_ne!(id1, id2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn address_matches_hash_of_bytes() {
        let store = InMemoryBlockStore::new();
        let id = store.put(b"verify me".to_vec()).await.unwrap();
        assert_eq!(id, ObjectId::from_bytes(b"verify me"));
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn len_total_bytes_and_clear() {
        let store = InMemoryBlockStore::new();
        assert!(store.is_empty());

        store.put(b"12345".to_vec()).await.unwrap(); // 5 bytes
        store.put(b"123456789".to_vec()).await.unwrap(); // 9 bytes
        assert_eq!(store.len(), 2);
        assert_eq!(store.total_bytes(), 14);

        store.clear();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn all_ids_is_sorted_and_complete() {
        let store = InMemoryBlockStore::new();
        let id1 = store.put(b"one".to_vec()).await.unwrap();
        let id2 = store.put(b"two".to_vec()).await.unwrap();

        let ids = store.all_ids();
        assert_eq!(ids.len(), 2);
        for w in ids.windows(2) {
            assert!(w[0] <= w[1]);
        }
        assert!(ids.contains(&id1));
        assert!(ids.contains(&id2));
    }

    // -----------------------------------------------------------------------
    // Concurrent read safety
    // -----------------------------------------------------------------------

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_reads_are_safe() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryBlockStore::new());
        let id = store.put(b"shared data".to_vec()).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let bytes = store.get(&id).await.unwrap();
                    assert_eq!(ObjectId::from_bytes(&bytes), id);
                })
            })
            .collect();

        for h in handles {
            h.await.expect("task should not panic");
        }
    }

    #[tokio::test]
    async fn debug_format() {
        let store = InMemoryBlockStore::new();
        store.put(b"x".to_vec()).await.unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryBlockStore"));
        assert!(debug.contains("block_count"));
    }
}
