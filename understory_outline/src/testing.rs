// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for unit tests.

use alloc::vec::Vec;
use core::cell::Cell;

use hashbrown::HashMap;
use kurbo::{Point, Size};

use crate::error::RenderFault;
use crate::render::{Part, Renderer};
use crate::source::TreeSource;

/// A `u32`-keyed tree with node `0` as root.
#[derive(Clone, Debug, Default)]
pub(crate) struct Fixture {
    children: HashMap<u32, Vec<u32>>,
    parents: HashMap<u32, u32>,
    claimed_counts: HashMap<u32, usize>,
}

impl Fixture {
    pub(crate) fn from_edges(edges: &[(u32, u32)]) -> Self {
        let mut fx = Self::default();
        for &(parent, child) in edges {
            fx.children.entry(parent).or_default().push(child);
            fx.parents.insert(child, parent);
        }
        fx
    }

    /// `0 -> [1, 2]`, `1 -> [3, 4]`.
    pub(crate) fn sample() -> Self {
        Self::from_edges(&[(0, 1), (0, 2), (1, 3), (1, 4)])
    }

    /// A root with `n` leaf children numbered `1..=n`.
    pub(crate) fn flat(n: u32) -> Self {
        let edges: Vec<(u32, u32)> = (1..=n).map(|c| (0, c)).collect();
        Self::from_edges(&edges)
    }

    pub(crate) fn lie_about_children(&mut self, node: u32, count: usize) {
        self.claimed_counts.insert(node, count);
    }
}

impl TreeSource for Fixture {
    type Key = u32;

    fn root(&self) -> Option<u32> {
        Some(0)
    }

    fn parent(&self, node: u32) -> Option<u32> {
        self.parents.get(&node).copied()
    }

    fn child_count(&self, node: u32) -> usize {
        self.claimed_counts
            .get(&node)
            .copied()
            .unwrap_or_else(|| self.children.get(&node).map_or(0, Vec::len))
    }

    fn child_at(&self, node: u32, index: usize) -> Option<u32> {
        self.children.get(&node)?.get(index).copied()
    }

    fn child_index(&self, node: u32) -> Option<usize> {
        let parent = self.parents.get(&node)?;
        self.children[parent].iter().position(|c| *c == node)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PaintOp {
    Part(Part, u32, Point),
    Label(u32, Point, bool),
    Connector(Point, Point),
}

/// Toggles 10x10, icons 16x16, labels 40x20.
#[derive(Debug, Default)]
pub(crate) struct FixedRenderer {
    pub(crate) failing_label: Option<u32>,
    pub(crate) failing_paint: Option<u32>,
    pub(crate) label_queries: Cell<usize>,
}

impl Renderer<u32> for FixedRenderer {
    type Surface = Vec<PaintOp>;

    fn part_size(&self, part: Part) -> Result<Size, RenderFault> {
        Ok(match part {
            Part::ToggleOpen | Part::ToggleClosed => Size::new(10.0, 10.0),
            _ => Size::new(16.0, 16.0),
        })
    }

    fn label_size(&self, node: u32) -> Result<Size, RenderFault> {
        self.label_queries.set(self.label_queries.get() + 1);
        if self.failing_label == Some(node) {
            return Err(RenderFault::new("label size unavailable"));
        }
        Ok(Size::new(40.0, 20.0))
    }

    fn paint_part(
        &self,
        part: Part,
        surface: &mut Vec<PaintOp>,
        origin: Point,
        node: u32,
    ) -> Result<(), RenderFault> {
        surface.push(PaintOp::Part(part, node, origin));
        Ok(())
    }

    fn paint_label(
        &self,
        surface: &mut Vec<PaintOp>,
        origin: Point,
        node: u32,
        selected: bool,
    ) -> Result<(), RenderFault> {
        if self.failing_paint == Some(node) {
            return Err(RenderFault::new("label paint failed"));
        }
        surface.push(PaintOp::Label(node, origin, selected));
        Ok(())
    }

    fn paint_connector(
        &self,
        surface: &mut Vec<PaintOp>,
        from: Point,
        to: Point,
    ) -> Result<(), RenderFault> {
        surface.push(PaintOp::Connector(from, to));
        Ok(())
    }
}

pub(crate) fn labels_painted(ops: &[PaintOp]) -> Vec<u32> {
    ops.iter()
        .filter_map(|op| match op {
            PaintOp::Label(n, ..) => Some(*n),
            _ => None,
        })
        .collect()
}
