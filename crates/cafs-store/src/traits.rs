use async_trait::async_trait;
use cafs_types::ObjectId;

use crate::error::StoreResult;

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - `put` computes the address from the bytes alone: storing identical
///   bytes twice yields the identical [`ObjectId`], and the second write
///   is a no-op.
/// - Blocks are immutable once written; content addressing guarantees a
///   key never maps to two different values.
/// - The store never interprets block contents.
/// - All I/O errors are propagated, never silently ignored. Write-write
///   races are the backend's problem; identical concurrent writes are
///   harmless by idempotency.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Store a block and return its content address.
    async fn put(&self, bytes: Vec<u8>) -> StoreResult<ObjectId>;

    /// Read a block by address.
    ///
    /// Fails with [`StoreError::NotFound`] if the block is absent. Callers
    /// that treat a miss as an expected outcome call [`has`] first.
    ///
    /// [`StoreError::NotFound`]: crate::StoreError::NotFound
    /// [`has`]: BlockStore::has
    async fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>>;

    /// Check whether a block exists in the store.
    async fn has(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Delete a block by address. Returns `true` if the block existed.
    ///
    /// Intended for garbage collection only; deleting a referenced block
    /// breaks every DAG that links to it.
    async fn delete(&self, id: &ObjectId) -> StoreResult<bool>;
}
