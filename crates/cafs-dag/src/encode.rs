//! The encoder: slices a node tree into a Merkle-DAG of size-bounded,
//! content-addressed blocks.
//!
//! Files at most one block long become a single blob. Larger files become
//! a height-balanced tree of list objects over consecutive blob chunks,
//! consumed strictly left-to-right so that concatenating leaf blobs in
//! link order (depth-first, link order at every level) reproduces the
//! original bytes exactly. Directories become tree objects whose links
//! carry child names, in iteration order.
//!
//! # Invariants
//!
//! - Every blob payload is at most `block_limit` bytes.
//! - Every list/tree object has at most `fan_out` direct links.
//! - Every recursive build step returns the child's link (address, size,
//!   kind) directly; there is no object-identity side table and no state
//!   outside the current encode call.
//!
//! Store failures abort the in-flight subtree and propagate unchanged.
//! Already-persisted siblings are not rolled back: content addressing
//! makes them harmless unreferenced blocks.

use futures::future::BoxFuture;
use tracing::debug;

use cafs_store::BlockStore;
use cafs_types::ObjectId;

use crate::error::{DagError, DagResult};
use crate::node::{DirNode, FileNode, Node, NodeKind};
use crate::object::{FsObject, Link, ObjectKind, BLOCK_LIMIT, LIST_LIMIT};

/// Encode a node tree and return the root content address.
///
/// Public entry point wrapping an [`Encoder`] with the standard limits.
pub async fn encode(store: &dyn BlockStore, node: &dyn Node) -> DagResult<ObjectId> {
    Encoder::new(store).encode(node).await
}

/// The tree builder. Holds the store and the two slicing limits.
///
/// The store is threaded through explicitly; an encoder is cheap to
/// construct and carries no state between `encode` calls.
pub struct Encoder<'a> {
    store: &'a dyn BlockStore,
    block_limit: usize,
    fan_out: usize,
}

impl<'a> Encoder<'a> {
    /// An encoder with the standard limits ([`BLOCK_LIMIT`], [`LIST_LIMIT`]).
    pub fn new(store: &'a dyn BlockStore) -> Self {
        Self::with_limits(store, BLOCK_LIMIT, LIST_LIMIT)
    }

    /// An encoder with substitute limits. Primarily for tests, where tiny
    /// limits make multi-level list nesting cheap to exercise.
    pub fn with_limits(store: &'a dyn BlockStore, block_limit: usize, fan_out: usize) -> Self {
        assert!(block_limit > 0, "block limit must be positive");
        assert!(fan_out > 1, "fan-out must be at least 2");
        Self {
            store,
            block_limit,
            fan_out,
        }
    }

    /// Encode a node tree and return the root content address.
    ///
    /// Dispatches on the node's kind; a node that claims a kind without
    /// providing the matching capability fails the whole encode.
    pub async fn encode(&self, node: &dyn Node) -> DagResult<ObjectId> {
        let link = match node.kind() {
            NodeKind::File => {
                let file = node.as_file().ok_or_else(|| unsupported(node))?;
                self.slice_file(file).await?
            }
            NodeKind::Directory => {
                let dir = node.as_dir().ok_or_else(|| unsupported(node))?;
                self.slice_dir(dir).await?
            }
        };
        debug!(
            root = %link.target.short_hex(),
            kind = %link.kind,
            size = link.size,
            "encoded node tree"
        );
        Ok(link.target)
    }

    /// Slice one file into a blob or a height-balanced list tree.
    async fn slice_file(&self, file: &dyn FileNode) -> DagResult<Link> {
        let data = file.bytes();
        if data.len() <= self.block_limit {
            return self.store_blob(data).await;
        }

        let block_count = data.len().div_ceil(self.block_limit);
        // Height = divisions of the block count by the fan-out until it
        // reaches zero; a list tree of this height always has room for
        // block_count leaves within the fan-out limit at every level.
        let mut height = 0u32;
        let mut remaining = block_count;
        while remaining > 0 {
            height += 1;
            remaining /= self.fan_out;
        }

        let (link, consumed) = self.dfs_slice_list(data, height, 0).await?;
        debug_assert_eq!(consumed, data.len());
        Ok(link)
    }

    /// Build one level of the list tree, consuming bytes left-to-right
    /// from `cursor`. Returns the persisted object's link and the number
    /// of bytes consumed.
    fn dfs_slice_list<'b>(
        &'b self,
        data: &'b [u8],
        height: u32,
        cursor: usize,
    ) -> BoxFuture<'b, DagResult<(Link, usize)>> {
        Box::pin(async move {
            if height == 1 {
                return self.union_blob(data, cursor).await;
            }

            let mut list = FsObject::list();
            let mut consumed = 0usize;
            for _ in 0..self.fan_out {
                if cursor + consumed >= data.len() {
                    break;
                }
                let (child, len) = self
                    .dfs_slice_list(data, height - 1, cursor + consumed)
                    .await?;
                consumed += len;
                list.push_link(child);
            }

            let link = self.persist(list, consumed as u64).await?;
            Ok((link, consumed))
        })
    }

    /// Partition the bytes from `cursor` into consecutive block-sized
    /// blobs; a single blob if the remainder fits in one block, otherwise
    /// a list over up to `fan_out` of them.
    async fn union_blob(&self, data: &[u8], cursor: usize) -> DagResult<(Link, usize)> {
        let remaining = data.len() - cursor;
        if remaining <= self.block_limit {
            let link = self.store_blob(&data[cursor..]).await?;
            return Ok((link, remaining));
        }

        let mut list = FsObject::list();
        let mut consumed = 0usize;
        for _ in 0..self.fan_out {
            let start = cursor + consumed;
            if start >= data.len() {
                break;
            }
            let end = usize::min(start + self.block_limit, data.len());
            let link = self.store_blob(&data[start..end]).await?;
            consumed += end - start;
            list.push_link(link);
        }

        let link = self.persist(list, consumed as u64).await?;
        Ok((link, consumed))
    }

    /// Encode one directory into a tree object. Children are processed in
    /// iteration order, which becomes link order in the persisted tree.
    fn slice_dir<'b>(&'b self, dir: &'b dyn DirNode) -> BoxFuture<'b, DagResult<Link>> {
        Box::pin(async move {
            let mut tree = FsObject::tree();
            let children: Vec<&dyn Node> = dir.children().collect();
            for child in children {
                match child.kind() {
                    NodeKind::File => {
                        let file = child.as_file().ok_or_else(|| unsupported(child))?;
                        let mut link = self.slice_file(file).await?;
                        link.name = file.name().to_string();
                        link.size = file.size();
                        tree.push_link(link);
                    }
                    NodeKind::Directory => {
                        let sub = child.as_dir().ok_or_else(|| unsupported(child))?;
                        let mut link = self.slice_dir(sub).await?;
                        link.name = sub.name().to_string();
                        tree.push_link(link);
                    }
                }
            }
            self.persist(tree, dir.size()).await
        })
    }

    /// Store one blob chunk.
    async fn store_blob(&self, chunk: &[u8]) -> DagResult<Link> {
        let size = chunk.len() as u64;
        self.persist(FsObject::blob(chunk.to_vec()), size).await
    }

    /// Persist an object and return its link.
    ///
    /// The block limit binds every non-tree payload; tripping it here
    /// means the slicing logic is broken, so it surfaces as a fatal
    /// invariant violation rather than a recoverable condition.
    async fn persist(&self, obj: FsObject, size: u64) -> DagResult<Link> {
        if obj.kind != ObjectKind::Tree && obj.data.len() > self.block_limit {
            return Err(DagError::BlockOverLimit {
                size: obj.data.len(),
                limit: self.block_limit,
            });
        }
        debug_assert!(obj.links.len() <= self.fan_out);

        let bytes = obj.to_wire()?;
        let id = self.store.put(bytes).await?;
        debug!(
            block = %id.short_hex(),
            kind = %obj.kind,
            links = obj.links.len(),
            size,
            "persisted object"
        );
        Ok(Link::unnamed(id, size, obj.kind))
    }
}

fn unsupported(node: &dyn Node) -> DagError {
    DagError::UnsupportedNodeType {
        name: node.name().to_string(),
        kind: node.kind(),
    }
}
