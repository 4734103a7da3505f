//! Content-addressed block storage capability for CAFS.
//!
//! The DAG engine does not persist anything itself — it writes through the
//! [`BlockStore`] trait and reads back by address. The trait models a store
//! that may well be remote (the reference deployment fronts an IPFS node),
//! so every access is asynchronous.
//!
//! # Contract
//!
//! 1. `put` is deterministic and content-addressed: identical bytes always
//!    yield the identical [`ObjectId`], and repeated writes are idempotent.
//! 2. `get` fails on absence; callers that want a non-fatal miss check
//!    `has` first.
//! 3. Blocks are immutable once written. Concurrent reads are always safe.
//! 4. The store never interprets block contents — it is a pure key-value
//!    store keyed by content hash.
//! 5. I/O errors are propagated, never silently swallowed.
//!
//! [`InMemoryBlockStore`] is the reference backend for tests and embedding.
//!
//! [`ObjectId`]: cafs_types::ObjectId

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBlockStore;
pub use traits::BlockStore;
