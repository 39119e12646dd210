// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The visibility window: current viewport plus the first visible node.

use kurbo::Rect;

use crate::metrics::MetricsCache;
use crate::source::TreeSource;
use crate::traversal::Logical;

/// Viewport rectangle (virtual coordinates) and its anchor node.
///
/// The anchor is the first node in logical order whose row extends below the
/// top edge of the viewport. Because layout assigns `y` in preorder, rows are
/// sorted by `y` in logical order, so every node that intersects the viewport
/// comes at or after the anchor. Painting and hit testing start from it.
///
/// When the viewport lies past the end of the content, the anchor falls back
/// to the last node of the logical tree.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityWindow<K> {
    viewport: Rect,
    anchor: Option<K>,
}

impl<K> Default for VisibilityWindow<K> {
    fn default() -> Self {
        Self {
            viewport: Rect::ZERO,
            anchor: None,
        }
    }
}

impl<K: Copy + Eq + core::hash::Hash + core::fmt::Debug> VisibilityWindow<K> {
    /// Viewport used by the last recompute.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// First visible node as of the last recompute.
    pub fn anchor(&self) -> Option<K> {
        self.anchor
    }

    /// Drops the anchor if it is `node` or was recorded under it.
    pub(crate) fn forget_branch(&mut self, node: K, cache: &MetricsCache<K>) {
        if let Some(a) = self.anchor
            && (a == node || cache.recorded_ancestor(node, a))
        {
            self.anchor = None;
        }
    }

    pub(crate) fn reset(&mut self) {
        self.anchor = None;
    }

    /// Chooses a new anchor for `viewport`. Returns `true` if it changed.
    ///
    /// With a usable previous anchor the search walks from it: backward when
    /// the viewport moved up past it, forward when it scrolled out above the
    /// viewport. Work is proportional to the rows scrolled over, not to the
    /// size of the tree. Without one, the search starts from whichever end of
    /// the content is closer to the viewport top.
    ///
    /// `cache` must hold current metrics for the logical tree.
    pub(crate) fn recompute<S>(
        &mut self,
        logical: &Logical<'_, S>,
        source: &S,
        cache: &MetricsCache<K>,
        viewport: Rect,
        content_height: f64,
    ) -> bool
    where
        S: TreeSource<Key = K>,
    {
        self.viewport = viewport;
        let top = viewport.y0;
        let reaches_top = |n: K| cache.get(n).is_some_and(|m| m.bounds().y1 > top);

        let previous = self
            .anchor
            .filter(|&a| cache.get(a).is_some() && !logical.is_hidden(a));
        let start = match previous {
            Some(a) => Some(a),
            None => source.root().map(|root| {
                if top > content_height / 2.0 {
                    logical.last(root)
                } else {
                    root
                }
            }),
        };

        let anchor = start.map(|start| {
            if reaches_top(start) {
                // Walk back while the previous row still reaches into the viewport.
                let mut current = start;
                while let Some(p) = logical.prev_visible(current) {
                    if !reaches_top(p) {
                        break;
                    }
                    current = p;
                }
                current
            } else {
                // Walk forward to the first row that reaches into the viewport.
                let mut current = start;
                while let Some(n) = logical.next_visible(current) {
                    current = n;
                    if reaches_top(n) {
                        break;
                    }
                }
                current
            }
        });

        let changed = anchor != self.anchor;
        #[cfg(feature = "tracing")]
        if changed {
            tracing::debug!(anchor = ?anchor, top, "visibility anchor moved");
        }
        self.anchor = anchor;
        changed
    }
}
