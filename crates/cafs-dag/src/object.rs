//! The DAG object model and its wire codec.
//!
//! A persisted unit is an [`FsObject`]: a kind tag, an ordered sequence of
//! [`Link`]s, and a raw payload. Link order is load-bearing — it is the
//! byte order of reconstruction for lists and the lookup order for trees.
//!
//! On the wire every object is one self-describing JSON record with hex
//! rendering for binary fields, so a root object's kind is discoverable
//! without a parent link. The codec is a lossless two-way mapping:
//! `from_wire(to_wire(x)) == x` for every valid object.

use serde::{Deserialize, Serialize};

use cafs_types::ObjectId;

use crate::error::{DagError, DagResult};

/// Maximum payload size of one blob, in bytes.
pub const BLOCK_LIMIT: usize = 256 * 1024;

/// Maximum number of direct links in one list or tree object.
pub const LIST_LIMIT: usize = 2048;

/// The kind of a persisted DAG object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A literal slice of original content. No links.
    Blob,
    /// Sibling chunks that concatenate, in link order, to one contiguous
    /// byte range.
    List,
    /// A directory: links are named children.
    Tree,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::List => write!(f, "list"),
            Self::Tree => write!(f, "tree"),
        }
    }
}

/// A reference from one DAG object to another.
///
/// The child's kind is an explicit field rather than a positional marker
/// in the owning object's payload, so a link is interpretable on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    /// Child name for tree links; empty for list-internal links.
    pub name: String,
    /// Content address of the referenced object.
    pub target: ObjectId,
    /// Byte length of the referenced subtree's reconstructed content.
    pub size: u64,
    /// Kind of the referenced object.
    pub kind: ObjectKind,
}

impl Link {
    /// A nameless link, as used inside lists. Tree links get their name
    /// assigned by the directory encoder.
    pub fn unnamed(target: ObjectId, size: u64, kind: ObjectKind) -> Self {
        Self {
            name: String::new(),
            target,
            size,
            kind,
        }
    }
}

/// A DAG object: the unit persisted to the block store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FsObject {
    /// What this object is.
    pub kind: ObjectKind,
    /// Ordered outgoing links. Order is reconstruction order.
    pub links: Vec<Link>,
    /// Literal content for blobs; empty for lists and trees.
    pub data: Vec<u8>,
}

impl FsObject {
    /// A blob holding a literal slice of content.
    pub fn blob(data: Vec<u8>) -> Self {
        Self {
            kind: ObjectKind::Blob,
            links: Vec::new(),
            data,
        }
    }

    /// An empty list object.
    pub fn list() -> Self {
        Self {
            kind: ObjectKind::List,
            links: Vec::new(),
            data: Vec::new(),
        }
    }

    /// An empty tree object.
    pub fn tree() -> Self {
        Self {
            kind: ObjectKind::Tree,
            links: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Append a link. Insertion order is reconstruction order.
    pub fn push_link(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Total reconstructed size of all linked subtrees.
    pub fn linked_size(&self) -> u64 {
        self.links.iter().map(|l| l.size).sum()
    }

    /// Encode to the wire record.
    pub fn to_wire(&self) -> DagResult<Vec<u8>> {
        let record = WireObject {
            kind: self.kind,
            links: self
                .links
                .iter()
                .map(|l| WireLink {
                    name: l.name.clone(),
                    hash: l.target.to_hex(),
                    size: l.size,
                    kind: l.kind,
                })
                .collect(),
            data: hex::encode(&self.data),
        };
        serde_json::to_vec(&record).map_err(|e| DagError::Codec(e.to_string()))
    }

    /// Decode from the wire record.
    pub fn from_wire(bytes: &[u8]) -> DagResult<Self> {
        let record: WireObject =
            serde_json::from_slice(bytes).map_err(|e| DagError::Codec(e.to_string()))?;
        let links = record
            .links
            .into_iter()
            .map(|l| {
                let target = ObjectId::from_hex(&l.hash)
                    .map_err(|e| DagError::Codec(format!("bad link hash: {e}")))?;
                Ok(Link {
                    name: l.name,
                    target,
                    size: l.size,
                    kind: l.kind,
                })
            })
            .collect::<DagResult<Vec<_>>>()?;
        let data = hex::decode(&record.data)
            .map_err(|e| DagError::Codec(format!("bad payload hex: {e}")))?;
        Ok(Self {
            kind: record.kind,
            links,
            data,
        })
    }
}

/// Wire form of a link: the hash rendered as hex text.
#[derive(Serialize, Deserialize)]
struct WireLink {
    name: String,
    hash: String,
    size: u64,
    kind: ObjectKind,
}

/// Wire form of an object. Binary fields are hex so the record stays
/// valid JSON end-to-end.
#[derive(Serialize, Deserialize)]
struct WireObject {
    kind: ObjectKind,
    links: Vec<WireLink>,
    data: String,
}
