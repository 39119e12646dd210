// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node layout records keyed by node identity.

use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;

use crate::source::TreeSource;

/// Cached layout result for one node.
///
/// Positions are in virtual (unscrolled) canvas coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Metrics {
    /// Top-left corner of the row.
    pub origin: Point,
    /// Bounding size of toggle glyph, icon, and label including the gaps between them.
    pub size: Size,
    /// Size of the label alone.
    pub view_size: Size,
    /// Size of the toggle glyph (zero for leaves).
    pub toggle_size: Size,
    /// Size of the icon.
    pub icon_size: Size,
    /// Expand state.
    pub is_open: bool,
    /// Bottom edge of this node's visible branch (itself plus open descendants).
    pub(crate) branch_bottom: f64,
    pub(crate) label_stale: bool,
}

impl Metrics {
    /// A record that has not been laid out yet.
    pub(crate) fn unplaced(is_open: bool) -> Self {
        Self {
            origin: Point::ZERO,
            size: Size::ZERO,
            view_size: Size::ZERO,
            toggle_size: Size::ZERO,
            icon_size: Size::ZERO,
            is_open,
            branch_bottom: 0.0,
            label_stale: true,
        }
    }

    /// Row bounds: `origin` extended by `size`.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    /// Bounds of the toggle glyph. Empty for leaves.
    pub fn toggle_bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.toggle_size)
    }

    /// Right edge of the toggle glyph; open children are indented to here.
    pub fn toggle_right(&self) -> f64 {
        self.origin.x + self.toggle_size.width
    }
}

/// A record plus the layout pass that last placed it.
#[derive(Clone, Debug)]
struct Slot {
    metrics: Metrics,
    /// `0` for records that were never placed.
    pass: u32,
}

/// Identity-keyed side table of [`Metrics`].
///
/// Absence of a record means "not yet computed", not "has no metrics".
/// Lookups only answer for nodes placed by the latest layout pass. Records of
/// nodes that have since been hidden under a closed ancestor are kept out of
/// sight so their open state and label size survive until they are shown again.
///
/// Alongside the records the cache keeps the parent links it has learned,
/// either from layout or from interaction with nodes that were never laid
/// out. Removing a branch follows these links, so it costs time proportional
/// to what is cached under the branch.
#[derive(Clone, Debug)]
pub struct MetricsCache<K> {
    records: HashMap<K, Slot>,
    parents: HashMap<K, K>,
    children: HashMap<K, SmallVec<[K; 4]>>,
    pass: u32,
    live: usize,
}

impl<K> Default for MetricsCache<K> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            parents: HashMap::new(),
            children: HashMap::new(),
            pass: 1,
            live: 0,
        }
    }
}

impl<K: Copy + Eq + Hash> MetricsCache<K> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records placed by the latest layout pass.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if the latest layout pass placed nothing.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// The record for `node`, if the latest layout pass visited it.
    pub fn get(&self, node: K) -> Option<&Metrics> {
        self.records
            .get(&node)
            .filter(|slot| slot.pass == self.pass)
            .map(|slot| &slot.metrics)
    }

    /// Recorded open state of `node`, including nodes that are currently hidden.
    pub fn is_open(&self, node: K) -> Option<bool> {
        self.records.get(&node).map(|slot| slot.metrics.is_open)
    }

    /// Any record for `node`, placed or not.
    pub(crate) fn get_mut(&mut self, node: K) -> Option<&mut Metrics> {
        self.records.get_mut(&node).map(|slot| &mut slot.metrics)
    }

    /// Stores `metrics` for `node` as part of the current pass, replacing any
    /// previous record.
    pub fn put(&mut self, node: K, metrics: Metrics) {
        let pass = self.pass;
        let previous = self.records.insert(node, Slot { metrics, pass });
        if previous.is_none_or(|slot| slot.pass != pass) {
            self.live += 1;
        }
    }

    /// The record for `node`, created unplaced with `default_open` if missing.
    pub(crate) fn entry(&mut self, node: K, default_open: bool) -> &mut Metrics {
        &mut self
            .records
            .entry(node)
            .or_insert_with(|| Slot {
                metrics: Metrics::unplaced(default_open),
                pass: 0,
            })
            .metrics
    }

    /// Starts a layout pass. Every record is hidden until visited again.
    pub(crate) fn begin_pass(&mut self) {
        self.pass = self.pass.wrapping_add(1).max(1);
        self.live = 0;
    }

    /// Places `node` in the current pass under `parent`, creating its record
    /// with `default_open` if missing.
    pub(crate) fn visit(
        &mut self,
        node: K,
        parent: Option<K>,
        default_open: bool,
    ) -> &mut Metrics {
        self.link(node, parent);
        let pass = self.pass;
        let slot = self.records.entry(node).or_insert_with(|| Slot {
            metrics: Metrics::unplaced(default_open),
            pass: 0,
        });
        if slot.pass != pass {
            slot.pass = pass;
            self.live += 1;
        }
        &mut slot.metrics
    }

    /// Records `parent` as the parent of `node`, replacing any earlier link.
    pub(crate) fn link(&mut self, node: K, parent: Option<K>) {
        let old = self.parents.get(&node).copied();
        if old == parent {
            return;
        }
        if let Some(old) = old
            && let Some(siblings) = self.children.get_mut(&old)
        {
            siblings.retain(|c| *c != node);
            if siblings.is_empty() {
                self.children.remove(&old);
            }
        }
        match parent {
            Some(p) => {
                self.parents.insert(node, p);
                self.children.entry(p).or_default().push(node);
            }
            None => {
                self.parents.remove(&node);
            }
        }
    }

    /// Links `node` and its ancestors as `source` reports them.
    ///
    /// Stops at the first link that is already known.
    pub(crate) fn link_ancestors<S: TreeSource<Key = K>>(&mut self, source: &S, node: K) {
        let mut current = node;
        while let Some(parent) = source.parent(current) {
            if self.parents.get(&current) == Some(&parent) {
                break;
            }
            self.link(current, Some(parent));
            current = parent;
        }
    }

    /// Drops the record for `node`. Evicting an absent key is a no-op.
    pub fn evict(&mut self, node: K) {
        if let Some(slot) = self.records.remove(&node)
            && slot.pass == self.pass
        {
            self.live -= 1;
        }
        self.link(node, None);
    }

    /// Drops `node` and every record linked below it. Returns the number of
    /// records removed.
    pub fn evict_branch(&mut self, node: K) -> usize {
        self.link(node, None);
        let mut evicted = 0;
        let mut stack: SmallVec<[K; 16]> = SmallVec::new();
        stack.push(node);
        while let Some(k) = stack.pop() {
            if let Some(slot) = self.records.remove(&k) {
                evicted += 1;
                if slot.pass == self.pass {
                    self.live -= 1;
                }
            }
            self.parents.remove(&k);
            if let Some(children) = self.children.remove(&k) {
                stack.extend(children);
            }
        }
        evicted
    }

    /// Returns `true` if the linked parent chain of `node` contains `ancestor`.
    pub fn recorded_ancestor(&self, ancestor: K, node: K) -> bool {
        let mut current = self.parents.get(&node).copied();
        // The chain is acyclic for any consistent source; bound the walk anyway.
        let mut budget = self.parents.len();
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            if budget == 0 {
                break;
            }
            budget -= 1;
            current = self.parents.get(&p).copied();
        }
        false
    }

    /// Drops all records and links, including open states.
    pub fn clear(&mut self) {
        self.records.clear();
        self.parents.clear();
        self.children.clear();
        self.live = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_put_evict() {
        let mut cache = MetricsCache::new();
        assert!(cache.get(1_u32).is_none());
        cache.put(1, Metrics::unplaced(true));
        assert!(cache.get(1).unwrap().is_open);
        assert_eq!(cache.len(), 1);
        cache.evict(1);
        cache.evict(1);
        assert!(cache.is_empty());
    }

    #[test]
    fn evict_branch_follows_links() {
        let mut cache = MetricsCache::new();
        cache.visit(0_u32, None, true);
        cache.visit(1, Some(0), true);
        cache.visit(2, Some(1), true);
        cache.visit(3, Some(2), true);
        cache.visit(4, Some(0), true);
        // Linked but never placed, as after toggling a node nobody laid out.
        cache.link(5, Some(3));
        cache.entry(5, false).is_open = true;

        assert!(cache.recorded_ancestor(1, 3));
        assert!(cache.recorded_ancestor(1, 5));
        assert!(!cache.recorded_ancestor(4, 3));

        assert_eq!(cache.evict_branch(1), 4);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(0).is_some());
        assert!(cache.get(4).is_some());
        assert!(cache.is_open(5).is_none());
        assert!(!cache.recorded_ancestor(1, 5));
    }

    #[test]
    fn a_new_pass_hides_records_until_revisited() {
        let mut cache = MetricsCache::new();
        cache.begin_pass();
        cache.visit(0_u32, None, true);
        cache.visit(1, Some(0), false).view_size = Size::new(40.0, 20.0);
        assert_eq!(cache.len(), 2);

        cache.begin_pass();
        cache.visit(0, None, true);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(1).is_none());
        // Hidden records keep their state.
        assert_eq!(cache.is_open(1), Some(false));

        cache.begin_pass();
        cache.visit(0, None, true);
        let m = cache.visit(1, Some(0), true);
        assert_eq!(m.view_size, Size::new(40.0, 20.0));
        assert!(!m.is_open);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn relinking_moves_a_node_between_parents() {
        let mut cache = MetricsCache::<u32>::new();
        cache.link(3, Some(1));
        cache.link(3, Some(2));
        assert!(cache.recorded_ancestor(2, 3));
        assert!(!cache.recorded_ancestor(1, 3));
        cache.entry(3, true);
        assert_eq!(cache.evict_branch(1), 0);
        assert_eq!(cache.evict_branch(2), 1);
    }

    #[test]
    fn bounds_and_toggle_geometry() {
        let m = Metrics {
            origin: Point::new(10.0, 20.0),
            size: Size::new(50.0, 12.0),
            toggle_size: Size::new(8.0, 8.0),
            ..Metrics::unplaced(false)
        };
        assert_eq!(m.bounds(), Rect::new(10.0, 20.0, 60.0, 32.0));
        assert_eq!(m.toggle_bounds(), Rect::new(10.0, 20.0, 18.0, 28.0));
        assert_eq!(m.toggle_right(), 18.0);
    }
}
