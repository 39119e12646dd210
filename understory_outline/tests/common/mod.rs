// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixtures shared by the integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use kurbo::{Point, Size};
use understory_outline::{NodeId, Part, RenderFault, Renderer, TreeModel};

/// Toggles 10x10, icons 16x16, labels 40x20. Paints the labelled node ids.
#[derive(Debug, Default)]
pub struct Boxes;

impl Renderer<NodeId> for Boxes {
    type Surface = Vec<NodeId>;

    fn part_size(&self, part: Part) -> Result<Size, RenderFault> {
        Ok(match part {
            Part::ToggleOpen | Part::ToggleClosed => Size::new(10.0, 10.0),
            _ => Size::new(16.0, 16.0),
        })
    }

    fn label_size(&self, _node: NodeId) -> Result<Size, RenderFault> {
        Ok(Size::new(40.0, 20.0))
    }

    fn paint_part(
        &self,
        _part: Part,
        _surface: &mut Vec<NodeId>,
        _origin: Point,
        _node: NodeId,
    ) -> Result<(), RenderFault> {
        Ok(())
    }

    fn paint_label(
        &self,
        surface: &mut Vec<NodeId>,
        _origin: Point,
        node: NodeId,
        _selected: bool,
    ) -> Result<(), RenderFault> {
        surface.push(node);
        Ok(())
    }
}

/// `root -> [a, b]`, `a -> [a1, a2]`.
pub struct ThreeLevel {
    pub model: TreeModel<&'static str>,
    pub root: NodeId,
    pub a: NodeId,
    pub b: NodeId,
    pub a1: NodeId,
    pub a2: NodeId,
}

impl ThreeLevel {
    pub fn new() -> Self {
        let mut model = TreeModel::new();
        let root = model.insert(None, "root");
        let a = model.insert(Some(root), "A");
        let b = model.insert(Some(root), "B");
        let a1 = model.insert(Some(a), "A1");
        let a2 = model.insert(Some(a), "A2");
        model.take_changes();
        Self {
            model,
            root,
            a,
            b,
            a1,
            a2,
        }
    }
}

/// A root with `n` leaf children, returned in row order (root first).
pub fn flat(n: usize) -> (TreeModel<usize>, Vec<NodeId>) {
    let mut model = TreeModel::new();
    let root = model.insert(None, 0);
    let mut rows = vec![root];
    rows.extend((1..=n).map(|i| model.insert(Some(root), i)));
    model.take_changes();
    (model, rows)
}

/// A tree where node `i > 0` hangs under node `parents[i - 1] % i`.
pub fn from_parent_picks(parents: &[usize]) -> (TreeModel<usize>, Vec<NodeId>) {
    let mut model = TreeModel::new();
    let mut ids = vec![model.insert(None, 0)];
    for (i, pick) in parents.iter().enumerate() {
        let index = i + 1;
        let parent = ids[pick % index];
        ids.push(model.insert(Some(parent), index));
    }
    model.take_changes();
    (model, ids)
}
