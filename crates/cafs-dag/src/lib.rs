//! Merkle-DAG file and directory encoding over a content-addressed
//! block store.
//!
//! This crate is the engine of CAFS. [`encode`] turns an in-memory file
//! or directory tree into a DAG of size-bounded, content-addressed
//! objects persisted through a [`BlockStore`]; [`resolve`] reverses the
//! process, walking from a root address down a slash-delimited path to
//! the exact original bytes.
//!
//! # Object Kinds
//!
//! - [`ObjectKind::Blob`] — a literal slice of content, at most
//!   [`BLOCK_LIMIT`] bytes
//! - [`ObjectKind::List`] — sibling chunks that concatenate, in link
//!   order, to one contiguous byte range
//! - [`ObjectKind::Tree`] — a directory whose links are named children
//!
//! # Design Rules
//!
//! 1. Link order within an object is exactly reconstruction order;
//!    siblings are encoded strictly left-to-right.
//! 2. Every list/tree object holds at most [`LIST_LIMIT`] direct links;
//!    larger collections gain levels of nesting instead.
//! 3. Objects are immutable once persisted and referenced only by
//!    address; an encode call keeps no state behind after it returns.
//! 4. Decode misses are `Ok(None)`, never errors. Store failures
//!    propagate unchanged.
//!
//! Store accesses are async and suspend the calling traversal; nothing
//! in the engine runs traversal steps concurrently, so persisted link
//! order always equals build order.

pub mod encode;
pub mod error;
pub mod node;
pub mod object;
pub mod resolve;

pub use encode::{encode, Encoder};
pub use error::{DagError, DagResult};
pub use node::{DirNode, FileNode, MemoryDir, MemoryFile, Node, NodeKind};
pub use object::{FsObject, Link, ObjectKind, BLOCK_LIMIT, LIST_LIMIT};
pub use resolve::resolve;

#[doc(no_inline)]
pub use cafs_store::BlockStore;
