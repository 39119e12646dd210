// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The hierarchical data source consumed by the outline view.

use core::fmt::Debug;
use core::hash::Hash;

/// Read-only capability view of an externally owned tree.
///
/// The outline never owns or mutates nodes. It refers to them by
/// [`Key`](TreeSource::Key), which must be a stable identity for as long as the
/// node exists in the source: the view keys its per-node layout cache on it.
///
/// All queries are expected to be synchronous and cheap (`O(1)` or
/// `O(children)`). A source that reports a `child_count` but then returns
/// `None` from [`child_at`](TreeSource::child_at) for an index below that
/// count is inconsistent; layout reports that as
/// [`OutlineError::InconsistentSource`](crate::OutlineError::InconsistentSource).
pub trait TreeSource {
    /// Stable node identity.
    type Key: Copy + Eq + Hash + Debug;

    /// The root node, or `None` for an empty source.
    fn root(&self) -> Option<Self::Key>;

    /// Parent of `node`, or `None` for the root.
    fn parent(&self, node: Self::Key) -> Option<Self::Key>;

    /// Number of children of `node`.
    fn child_count(&self, node: Self::Key) -> usize;

    /// The child of `node` at `index`.
    fn child_at(&self, node: Self::Key, index: usize) -> Option<Self::Key>;

    /// Position of `node` among its parent's children, or `None` for the root.
    fn child_index(&self, node: Self::Key) -> Option<usize>;

    /// Returns `true` if `node` has at least one child.
    fn has_children(&self, node: Self::Key) -> bool {
        self.child_count(node) > 0
    }
}

impl<S: TreeSource + ?Sized> TreeSource for &S {
    type Key = S::Key;

    fn root(&self) -> Option<Self::Key> {
        (**self).root()
    }

    fn parent(&self, node: Self::Key) -> Option<Self::Key> {
        (**self).parent(node)
    }

    fn child_count(&self, node: Self::Key) -> usize {
        (**self).child_count(node)
    }

    fn child_at(&self, node: Self::Key, index: usize) -> Option<Self::Key> {
        (**self).child_at(node, index)
    }

    fn child_index(&self, node: Self::Key) -> Option<usize> {
        (**self).child_index(node)
    }

    fn has_children(&self, node: Self::Key) -> bool {
        (**self).has_children(node)
    }
}

/// Structural notification delivered by the host after mutating its source.
///
/// Notifications must be delivered on the same thread that drives the view,
/// immediately after the change and before the next read.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceChange<K> {
    /// `node` (and any subtree under it) was added.
    Inserted(K),
    /// `node` and its whole subtree were removed.
    Removed(K),
    /// The content of `node` changed; its label may have a new size.
    Modified(K),
    /// The source was replaced wholesale; every cached record is stale.
    Reset,
}

/// Returns `true` if `ancestor` is a strict ancestor of `node` in `source`.
pub(crate) fn is_strict_ancestor<S: TreeSource>(source: &S, ancestor: S::Key, node: S::Key) -> bool {
    let mut current = source.parent(node);
    while let Some(p) = current {
        if p == ancestor {
            return true;
        }
        current = source.parent(p);
    }
    false
}
