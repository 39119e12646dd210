// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory, generational tree that implements [`TreeSource`].

use alloc::vec::Vec;

use crate::source::{SourceChange, TreeSource};

/// Identifier for a node in a [`TreeModel`] (generational).
///
/// A stale identifier (its node was removed, possibly with the slot reused)
/// never aliases a live node: every query on it answers as for an absent node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(u32, u32);

impl NodeId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    value: T,
}

/// Single-rooted tree of `T` values with stable [`NodeId`] handles.
///
/// Every mutation is recorded as a [`SourceChange`]. Hosts drain them with
/// [`TreeModel::take_changes`] and forward each one to
/// [`OutlineView::source_changed`](crate::OutlineView::source_changed).
///
/// ## Example
///
/// ```rust
/// use understory_outline::{SourceChange, TreeModel, TreeSource};
///
/// let mut model = TreeModel::new();
/// let root = model.insert(None, "root");
/// let a = model.insert(Some(root), "a");
/// let b = model.insert(Some(root), "b");
///
/// assert_eq!(model.child_count(root), 2);
/// assert_eq!(model.child_at(root, 1), Some(b));
/// assert_eq!(model.child_index(a), Some(0));
///
/// model.remove(a);
/// assert!(!model.is_alive(a));
/// assert_eq!(model.take_changes().last(), Some(&SourceChange::Removed(a)));
/// ```
#[derive(Clone, Debug)]
pub struct TreeModel<T> {
    slots: Vec<Option<Slot<T>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: Option<NodeId>,
    changes: Vec<SourceChange<NodeId>>,
}

impl<T> Default for TreeModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TreeModel<T> {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: None,
            changes: Vec::new(),
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Returns `true` if the model has no nodes.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    /// Appends `value` as the last child of `parent`.
    ///
    /// With `parent == None` the new node becomes the root; an existing root
    /// and its subtree are removed first.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale.
    pub fn insert(&mut self, parent: Option<NodeId>, value: T) -> NodeId {
        match parent {
            Some(p) => self
                .insert_at(p, usize::MAX, value)
                .expect("dangling parent NodeId"),
            None => self.set_root(value),
        }
    }

    /// Inserts `value` as a child of `parent` at `index` (clamped to the
    /// current child count). Returns `None` if `parent` is stale.
    pub fn insert_at(&mut self, parent: NodeId, index: usize, value: T) -> Option<NodeId> {
        if !self.is_alive(parent) {
            return None;
        }
        let id = self.alloc(Some(parent), value);
        let children = &mut self.slot_mut(parent)?.children;
        let index = index.min(children.len());
        children.insert(index, id);
        self.changes.push(SourceChange::Inserted(id));
        Some(id)
    }

    /// Removes a node and its whole subtree.
    ///
    /// A single [`SourceChange::Removed`] is recorded for `id`; descendants
    /// are implied.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.slot(id).and_then(|s| s.parent)
            && let Some(p) = self.slot_mut(parent)
        {
            p.children.retain(|c| *c != id);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        self.free_subtree(id);
        self.changes.push(SourceChange::Removed(id));
    }

    /// Replaces the value stored at `id`, recording a
    /// [`SourceChange::Modified`]. Returns the previous value.
    pub fn set_value(&mut self, id: NodeId, value: T) -> Option<T> {
        let slot = self.slot_mut(id)?;
        let old = core::mem::replace(&mut slot.value, value);
        self.changes.push(SourceChange::Modified(id));
        Some(old)
    }

    /// Returns the value stored at `id`.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slot(id).map(|s| &s.value)
    }

    /// Children of `id`, or an empty slice if `id` is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map_or(&[], |s| &s.children)
    }

    /// Drains the changes recorded since the last call, in mutation order.
    pub fn take_changes(&mut self) -> Vec<SourceChange<NodeId>> {
        core::mem::take(&mut self.changes)
    }

    // --- internals ---

    fn set_root(&mut self, value: T) -> NodeId {
        if let Some(old) = self.root.take() {
            self.free_subtree(old);
        }
        let id = self.alloc(None, value);
        self.root = Some(id);
        self.changes.push(SourceChange::Reset);
        id
    }

    fn alloc(&mut self, parent: Option<NodeId>, value: T) -> NodeId {
        let slot = |generation| Slot {
            generation,
            parent,
            children: Vec::new(),
            value,
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(slot(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(slot(generation)));
            self.generations.push(generation);
            (self.slots.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let idx = idx as u32;
        NodeId::new(idx, generation)
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = alloc::vec![id];
        while let Some(next) = stack.pop() {
            if let Some(slot) = self.slots[next.idx()].take() {
                stack.extend(slot.children);
                self.free_list.push(next.idx());
            }
        }
    }

    fn slot(&self, id: NodeId) -> Option<&Slot<T>> {
        self.slots
            .get(id.idx())
            .and_then(|s| s.as_ref())
            .filter(|s| s.generation == id.1)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(id.idx())
            .and_then(|s| s.as_mut())
            .filter(|s| s.generation == id.1)
    }
}

impl<T> TreeSource for TreeModel<T> {
    type Key = NodeId;

    fn root(&self) -> Option<NodeId> {
        self.root
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).and_then(|s| s.parent)
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.children_of(node).len()
    }

    fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.children_of(node).get(index).copied()
    }

    fn child_index(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children_of(parent).iter().position(|c| *c == node)
    }
}
