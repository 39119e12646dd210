// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard and pointer input understood by the outline view.

use kurbo::Point;

/// A navigation or toggle command, already decoded from the host's key events.
///
/// With no current selection, every navigation command selects the root.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Select the previous node in logical order.
    Up,
    /// Select the next node in logical order.
    Down,
    /// Select the root.
    Home,
    /// Select the last node in logical order.
    End,
    /// Move the selection back by one viewport height.
    PageUp,
    /// Move the selection forward by one viewport height.
    PageDown,
    /// Expand a closed branch, otherwise move down.
    Right,
    /// Collapse an open branch, otherwise select the parent.
    Left,
    /// Open the selected node if it is closed (typically `+`).
    Expand,
    /// Close the selected node if it is open (typically `-`).
    Collapse,
}

impl Key {
    /// Returns `true` for keys that only act on the open state.
    pub const fn is_toggle(self) -> bool {
        matches!(self, Self::Expand | Self::Collapse)
    }
}

/// A primary-button press in viewport (scrolled) coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerPress {
    /// Press position relative to the viewport's top-left corner.
    pub position: Point,
}

impl PointerPress {
    /// A press at `position`.
    pub const fn new(position: Point) -> Self {
        Self { position }
    }
}
