// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Directional traversal over the logical tree.
//!
//! The logical tree is the source tree with every closed node treated as a
//! leaf. Traversal order is depth-first preorder, which is also top-to-bottom
//! row order after layout.

use crate::metrics::MetricsCache;
use crate::source::TreeSource;

/// Direction of a paging step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward the end of the content.
    Forward,
    /// Toward the start of the content.
    Backward,
}

/// Open-state-aware traversal over a source.
///
/// Nodes without a cached record are treated as being in the default open
/// state, which is exactly the state the layout pass will give them.
#[derive(Debug)]
pub struct Logical<'a, S: TreeSource> {
    source: &'a S,
    cache: &'a MetricsCache<S::Key>,
    default_open: bool,
}

impl<'a, S: TreeSource> Logical<'a, S> {
    /// Creates a traversal view.
    pub fn new(source: &'a S, cache: &'a MetricsCache<S::Key>, default_open: bool) -> Self {
        Self {
            source,
            cache,
            default_open,
        }
    }

    /// Returns the effective open state of `node`.
    pub fn is_open(&self, node: S::Key) -> bool {
        self.cache.is_open(node).unwrap_or(self.default_open)
    }

    /// Returns `true` if any strict ancestor of `node` is closed.
    pub fn is_hidden(&self, node: S::Key) -> bool {
        self.outermost_closed_ancestor(node).is_some()
    }

    /// Next node in logical order, or `None` past the last node.
    ///
    /// The first child if `node` is open and has children, otherwise the next
    /// sibling of the nearest ancestor (or `node` itself) that has one. A
    /// hidden `node` steps from its outermost closed ancestor.
    pub fn next(&self, node: S::Key) -> Option<S::Key> {
        let from = self.outermost_closed_ancestor(node).unwrap_or(node);
        self.next_visible(from)
    }

    /// Previous node in logical order, or `None` for the root.
    ///
    /// The deepest last open descendant of the previous sibling, otherwise
    /// the parent. A hidden `node` steps to its outermost closed ancestor.
    pub fn prev(&self, node: S::Key) -> Option<S::Key> {
        match self.outermost_closed_ancestor(node) {
            Some(ancestor) => Some(ancestor),
            None => self.prev_visible(node),
        }
    }

    /// The last node of the logical subtree rooted at `node`: `node` itself
    /// if it is closed or childless, else `last(last_child)`.
    pub fn last(&self, node: S::Key) -> S::Key {
        let mut current = node;
        while self.is_open(current) {
            let count = self.source.child_count(current);
            match count.checked_sub(1).and_then(|i| self.source.child_at(current, i)) {
                Some(child) => current = child,
                None => break,
            }
        }
        current
    }

    /// Steps from `start` in `direction` for up to one page.
    ///
    /// Rows are passed over while the cumulative height of the rows passed
    /// (including the gaps between them) still fits in `page_height`; the node
    /// reached is returned. No row is skipped without having fit on the page,
    /// and at least one step is taken when possible so a row taller than the
    /// page cannot stall paging. Heights come from the cache, so layout must
    /// be current.
    pub fn next_page(
        &self,
        start: S::Key,
        direction: Direction,
        page_height: f64,
        gap: f64,
    ) -> S::Key {
        let step = |n| match direction {
            Direction::Forward => self.next(n),
            Direction::Backward => self.prev(n),
        };
        let height = |n| self.cache.get(n).map_or(0.0, |m| m.size.height);

        let mut current = start;
        let mut span = 0.0;
        let mut first = true;
        loop {
            let add = if first { height(current) } else { gap + height(current) };
            if span + add > page_height {
                break;
            }
            span += add;
            first = false;
            match step(current) {
                Some(n) => current = n,
                None => break,
            }
        }
        if current == start {
            step(start).unwrap_or(start)
        } else {
            current
        }
    }

    /// [`Logical::next`] for a node known to be visible.
    pub(crate) fn next_visible(&self, node: S::Key) -> Option<S::Key> {
        if self.is_open(node) && self.source.has_children(node) {
            return self.source.child_at(node, 0);
        }
        let mut current = node;
        loop {
            let parent = self.source.parent(current)?;
            let index = self.source.child_index(current)?;
            if index + 1 < self.source.child_count(parent) {
                return self.source.child_at(parent, index + 1);
            }
            current = parent;
        }
    }

    /// [`Logical::prev`] for a node known to be visible.
    pub(crate) fn prev_visible(&self, node: S::Key) -> Option<S::Key> {
        let parent = self.source.parent(node)?;
        match self.source.child_index(node)? {
            0 => Some(parent),
            index => self
                .source
                .child_at(parent, index - 1)
                .map(|sibling| self.last(sibling)),
        }
    }

    fn outermost_closed_ancestor(&self, node: S::Key) -> Option<S::Key> {
        let mut found = None;
        let mut current = self.source.parent(node);
        while let Some(p) = current {
            if !self.is_open(p) {
                found = Some(p);
            }
            current = self.source.parent(p);
        }
        found
    }
}
