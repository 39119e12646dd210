// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pluggable per-node renderers.

use kurbo::{Point, Size};

use crate::error::RenderFault;

/// Fixed-size visual parts drawn before a node's label.
///
/// These are shared per kind, so the view queries each part's size once per
/// layout pass rather than once per node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Part {
    /// Toggle glyph of an expanded branch.
    ToggleOpen,
    /// Toggle glyph of a collapsed branch.
    ToggleClosed,
    /// Icon of a node without children.
    LeafIcon,
    /// Icon of an expanded branch.
    BranchOpenIcon,
    /// Icon of a collapsed branch.
    BranchClosedIcon,
}

impl Part {
    /// The toggle glyph for a branch in the given state.
    pub const fn toggle(open: bool) -> Self {
        if open { Self::ToggleOpen } else { Self::ToggleClosed }
    }

    /// The icon for a node with the given shape and state.
    pub const fn icon(has_children: bool, open: bool) -> Self {
        match (has_children, open) {
            (false, _) => Self::LeafIcon,
            (true, true) => Self::BranchOpenIcon,
            (true, false) => Self::BranchClosedIcon,
        }
    }
}

/// Size and paint contracts for every visual element of a row.
///
/// A part that should not be drawn reports [`Size::ZERO`]; no gap is reserved
/// around empty parts. All positions handed to the paint methods are in
/// surface (scrolled) coordinates.
///
/// Any method may fail. Faults are logged and counted, and the view carries on
/// with the remaining parts and nodes.
pub trait Renderer<K> {
    /// The drawing target handed through to the paint methods.
    type Surface: ?Sized;

    /// Preferred size of a glyph or icon part.
    fn part_size(&self, part: Part) -> Result<Size, RenderFault>;

    /// Preferred size of the label for `node`.
    fn label_size(&self, node: K) -> Result<Size, RenderFault>;

    /// Paints `part` for `node` with its top-left corner at `origin`.
    fn paint_part(
        &self,
        part: Part,
        surface: &mut Self::Surface,
        origin: Point,
        node: K,
    ) -> Result<(), RenderFault>;

    /// Paints the label for `node` with its top-left corner at `origin`.
    fn paint_label(
        &self,
        surface: &mut Self::Surface,
        origin: Point,
        node: K,
        selected: bool,
    ) -> Result<(), RenderFault>;

    /// Paints one straight connector segment. Only called when lines are shown.
    fn paint_connector(
        &self,
        surface: &mut Self::Surface,
        from: Point,
        to: Point,
    ) -> Result<(), RenderFault> {
        let _ = (surface, from, to);
        Ok(())
    }
}
