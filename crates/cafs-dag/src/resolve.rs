//! The decoder: walks a DAG from a root address down a slash-delimited
//! path and reconstructs the original byte stream.
//!
//! A miss is an expected outcome, not an error: an absent root and an
//! unmatched path segment both yield `Ok(None)`. Only genuine failures
//! (store I/O, a missing interior block, a record contradicting its
//! link) surface as errors.

use futures::future::BoxFuture;
use tracing::debug;

use cafs_store::BlockStore;
use cafs_types::ObjectId;

use crate::error::{DagError, DagResult};
use crate::object::{FsObject, Link, ObjectKind};

/// Resolve `path` under the DAG rooted at `root` and return the exact
/// original bytes, or `None` when the root is absent or no entry matches.
///
/// The path is split on `/` with empty segments discarded, so `"a//b/"`
/// and `"a/b"` name the same entry. An empty path resolves the root
/// itself: a blob yields its payload, a list its concatenated byte range;
/// a tree has no byte content of its own and yields `None`.
pub async fn resolve(
    store: &dyn BlockStore,
    root: &ObjectId,
    path: &str,
) -> DagResult<Option<Vec<u8>>> {
    if !store.has(root).await? {
        debug!(root = %root.short_hex(), "resolve miss: root not in store");
        return Ok(None);
    }
    let obj = fetch_object(store, root).await?;

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return match obj.kind {
            ObjectKind::Blob => Ok(Some(obj.data)),
            ObjectKind::List => resolve_list(store, &obj).await.map(Some),
            ObjectKind::Tree => Ok(None),
        };
    }
    resolve_in_tree(store, &obj, &segments, 0).await
}

/// Scan one tree level for `segments[depth]`, dispatching on the matched
/// link's kind.
///
/// A miss below a matching subtree resumes the sibling scan rather than
/// failing the whole lookup — duplicate names at one level are tolerated,
/// and the first subtree that actually contains the rest of the path
/// wins. Blob and list links are terminal: they yield the referenced
/// content and any remaining path segments are ignored.
fn resolve_in_tree<'a>(
    store: &'a dyn BlockStore,
    obj: &'a FsObject,
    segments: &'a [&'a str],
    depth: usize,
) -> BoxFuture<'a, DagResult<Option<Vec<u8>>>> {
    Box::pin(async move {
        let Some(target) = segments.get(depth) else {
            // Path exhausted at a directory: nothing to return.
            return Ok(None);
        };

        for link in &obj.links {
            if link.name != *target {
                continue;
            }
            match link.kind {
                ObjectKind::Tree => {
                    let child = fetch_linked(store, link).await?;
                    if let Some(bytes) =
                        resolve_in_tree(store, &child, segments, depth + 1).await?
                    {
                        return Ok(Some(bytes));
                    }
                }
                ObjectKind::Blob => {
                    let child = fetch_linked(store, link).await?;
                    return Ok(Some(child.data));
                }
                ObjectKind::List => {
                    let child = fetch_linked(store, link).await?;
                    return Ok(Some(resolve_list(store, &child).await?));
                }
            }
        }

        debug!(segment = %target, depth, "resolve miss: no matching link");
        Ok(None)
    })
}

/// Reconstruct the contiguous byte range a list object describes by
/// concatenating its children in link order.
fn resolve_list<'a>(
    store: &'a dyn BlockStore,
    obj: &'a FsObject,
) -> BoxFuture<'a, DagResult<Vec<u8>>> {
    Box::pin(async move {
        let mut out = Vec::with_capacity(obj.linked_size() as usize);
        for link in &obj.links {
            match link.kind {
                ObjectKind::Blob => {
                    let child = fetch_linked(store, link).await?;
                    out.extend_from_slice(&child.data);
                }
                ObjectKind::List => {
                    let child = fetch_linked(store, link).await?;
                    out.extend_from_slice(&resolve_list(store, &child).await?);
                }
                ObjectKind::Tree => {
                    return Err(DagError::CorruptObject {
                        id: link.target,
                        reason: "tree link inside a byte-range list".to_string(),
                    });
                }
            }
        }
        Ok(out)
    })
}

/// Fetch and decode one object by address.
async fn fetch_object(store: &dyn BlockStore, id: &ObjectId) -> DagResult<FsObject> {
    let bytes = store.get(id).await?;
    FsObject::from_wire(&bytes)
}

/// Fetch a linked object and verify the record agrees with the link's
/// declared kind.
async fn fetch_linked(store: &dyn BlockStore, link: &Link) -> DagResult<FsObject> {
    let obj = fetch_object(store, &link.target).await?;
    if obj.kind != link.kind {
        return Err(DagError::CorruptObject {
            id: link.target,
            reason: format!("link says {}, stored record is {}", link.kind, obj.kind),
        });
    }
    Ok(obj)
}
