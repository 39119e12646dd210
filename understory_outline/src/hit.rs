// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point hit testing scoped to the visible part of the logical tree.

use core::ops::Range;

use kurbo::Point;

use crate::metrics::MetricsCache;
use crate::source::TreeSource;

/// Bounded point lookup over laid-out metrics.
///
/// The search starts at the visibility anchor: first the anchor's own branch,
/// then, walking up its ancestor chain, each ancestor's later siblings. Rows
/// are sorted by `y` in logical order and each record knows where its branch
/// ends, so siblings are picked by binary search and whole branches are
/// skipped without being visited. Cost is proportional to depth times the log
/// of the fan-out, never to the size of the tree.
pub(crate) struct HitTester<'a, S: TreeSource> {
    source: &'a S,
    cache: &'a MetricsCache<S::Key>,
    point: Point,
}

impl<'a, S: TreeSource> HitTester<'a, S> {
    pub(crate) fn new(source: &'a S, cache: &'a MetricsCache<S::Key>, point: Point) -> Self {
        Self {
            source,
            cache,
            point,
        }
    }

    /// The node whose row bounds contain the point, if any.
    pub(crate) fn locate(&self, anchor: Option<S::Key>) -> Option<S::Key> {
        let mut current = anchor?;
        let first = self.cache.get(current)?;
        if self.point.y < first.origin.y {
            // Above the first visible row.
            return None;
        }
        if self.within_branch(current) {
            return self.descend(current);
        }

        loop {
            let parent = self.source.parent(current)?;
            let index = self.source.child_index(current)?;
            let count = self.source.child_count(parent);
            let later = index + 1..count;
            match self.last_starting_at_or_before(parent, later.clone()) {
                Some(j) => {
                    let sibling = self.source.child_at(parent, j)?;
                    if self.within_branch(sibling) {
                        return self.descend(sibling);
                    }
                    if j + 1 < count {
                        // In the gap before the next sibling.
                        return None;
                    }
                }
                None if !later.is_empty() => return None,
                None => {}
            }
            current = parent;
        }
    }

    /// Search inside a branch known to span the point vertically.
    fn descend(&self, node: S::Key) -> Option<S::Key> {
        let mut current = node;
        loop {
            let m = self.cache.get(current)?;
            let bounds = m.bounds();
            if bounds.contains(self.point) {
                return Some(current);
            }
            // Children start below this row.
            if self.point.y < bounds.y1 || !m.is_open {
                return None;
            }
            let count = self.source.child_count(current);
            let j = self.last_starting_at_or_before(current, 0..count)?;
            let child = self.source.child_at(current, j)?;
            if !self.within_branch(child) {
                return None;
            }
            current = child;
        }
    }

    fn within_branch(&self, node: S::Key) -> bool {
        self.cache
            .get(node)
            .is_some_and(|m| m.origin.y <= self.point.y && self.point.y < m.branch_bottom)
    }

    /// Index in `range` of the last child of `parent` whose row starts at or
    /// above the point.
    fn last_starting_at_or_before(&self, parent: S::Key, range: Range<usize>) -> Option<usize> {
        let top_of = |i| {
            self.source
                .child_at(parent, i)
                .and_then(|c| self.cache.get(c))
                .map_or(f64::INFINITY, |m| m.origin.y)
        };
        let (mut lo, mut hi) = (range.start, range.end);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if top_of(mid) <= self.point.y {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        (lo > range.start).then(|| lo - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutlineConfig;
    use crate::layout::layout;
    use crate::testing::{FixedRenderer, Fixture};

    fn laid_out(fx: &Fixture) -> MetricsCache<u32> {
        let mut cache = MetricsCache::new();
        let config = OutlineConfig::default()
            .with_default_open(true)
            .with_vertical_gap(2.0);
        layout(fx, &FixedRenderer::default(), &mut cache, &config).unwrap();
        cache
    }

    #[test]
    fn finds_rows_from_the_anchor_branch_and_ancestor_siblings() {
        // Rows: 0@0, 1@22, 3@44, 4@66, 2@88. Children of 0 at x=10, of 1 at x=20.
        let fx = Fixture::sample();
        let cache = laid_out(&fx);
        let at = |x, y, anchor| HitTester::new(&fx, &cache, Point::new(x, y)).locate(anchor);

        assert_eq!(at(5.0, 5.0, Some(0)), Some(0));
        assert_eq!(at(25.0, 50.0, Some(0)), Some(3));
        assert_eq!(at(25.0, 70.0, Some(3)), Some(4));
        // From anchor 3, row 2 is a later sibling of the anchor's parent.
        assert_eq!(at(15.0, 90.0, Some(3)), Some(2));
    }

    #[test]
    fn misses_return_none() {
        let fx = Fixture::sample();
        let cache = laid_out(&fx);
        let at = |x, y, anchor| HitTester::new(&fx, &cache, Point::new(x, y)).locate(anchor);

        // Gap between rows.
        assert_eq!(at(25.0, 65.0, Some(0)), None);
        // Left of an indented row.
        assert_eq!(at(2.0, 50.0, Some(0)), None);
        // Right of every row.
        assert_eq!(at(500.0, 50.0, Some(0)), None);
        // Below all content.
        assert_eq!(at(15.0, 500.0, Some(0)), None);
        // Above the anchor.
        assert_eq!(at(15.0, 5.0, Some(2)), None);
        assert_eq!(at(15.0, 5.0, None), None);
    }

    #[test]
    fn wide_fan_out_is_searched_by_bisection() {
        let fx = Fixture::flat(1000);
        let cache = laid_out(&fx);
        let hit = HitTester::new(&fx, &cache, Point::new(15.0, 22.0 * 777.0 + 3.0)).locate(Some(0));
        assert_eq!(hit, Some(777));
    }
}
