//! Error types for the DAG engine.

use cafs_store::StoreError;
use cafs_types::ObjectId;

use crate::node::NodeKind;

/// Errors that can occur while encoding or resolving a DAG.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// Encode was called on a node that claims a kind without providing
    /// the matching capability.
    #[error("unsupported node type: '{name}' does not provide the {kind} capability")]
    UnsupportedNodeType {
        /// Name of the offending node.
        name: String,
        /// The kind the node claimed.
        kind: NodeKind,
    },

    /// A non-tree payload exceeded the block limit at persist time.
    /// This is an encoder invariant violation, not a caller error.
    #[error("block over limit: {size} byte payload exceeds the {limit} byte block limit")]
    BlockOverLimit { size: usize, limit: usize },

    /// A fetched object contradicts what its link declared.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// Wire record could not be encoded or decoded.
    #[error("wire codec error: {0}")]
    Codec(String),

    /// Store failure, propagated unchanged. Retry policy, if any, belongs
    /// to the store backend.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for DAG results.
pub type DagResult<T> = Result<T, DagError>;
