// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll offset and viewport state shared with the scroll coordinator.

use kurbo::{Rect, Size, Vec2};

/// Alignment mode when scrolling a rectangle into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Align the start (top/leading edge) of the rectangle with the viewport.
    Start,
    /// Center the rectangle within the viewport.
    Center,
    /// Align the end (bottom/trailing edge) of the rectangle with the viewport.
    End,
    /// Move just enough to make the rectangle fully visible, preferring the
    /// smallest change from the current scroll offset.
    Nearest,
}

/// Scroll offset plus viewport size, both in virtual canvas units.
///
/// The offset is the translation applied when painting: a node at virtual
/// position `p` is drawn at `p - offset`. Offsets are clamped to be
/// non-negative; clamping against the content size is left to
/// [`ScrollState::clamp_to_content`] so hosts can overscroll if they wish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    offset: Vec2,
    viewport: Size,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl ScrollState {
    /// Creates a state at offset zero with the given viewport size.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            offset: Vec2::ZERO,
            viewport: clamp_size(viewport),
        }
    }

    /// Returns the current scroll offset.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Sets the scroll offset. Returns `true` if it changed.
    pub fn set_offset(&mut self, offset: Vec2) -> bool {
        let offset = Vec2::new(offset.x.max(0.0), offset.y.max(0.0));
        if offset != self.offset {
            self.offset = offset;
            true
        } else {
            false
        }
    }

    /// Adjusts the scroll offset by `delta`. Returns `true` if it changed.
    pub fn scroll_by(&mut self, delta: Vec2) -> bool {
        self.set_offset(self.offset + delta)
    }

    /// Returns the current viewport size.
    #[must_use]
    pub const fn viewport_size(&self) -> Size {
        self.viewport
    }

    /// Sets the viewport size. Returns `true` if it changed.
    pub fn set_viewport_size(&mut self, viewport: Size) -> bool {
        let viewport = clamp_size(viewport);
        if viewport != self.viewport {
            self.viewport = viewport;
            true
        } else {
            false
        }
    }

    /// The viewport expressed in virtual canvas coordinates.
    #[must_use]
    pub fn viewport_rect(&self) -> Rect {
        Rect::from_origin_size(self.offset.to_point(), self.viewport)
    }

    /// Clamps the offset so the viewport stays within `content`.
    ///
    /// When the content fits inside the viewport along an axis, the offset on
    /// that axis becomes zero. Returns `true` if the offset changed.
    pub fn clamp_to_content(&mut self, content: Size) -> bool {
        let max_x = (content.width - self.viewport.width).max(0.0);
        let max_y = (content.height - self.viewport.height).max(0.0);
        self.set_offset(Vec2::new(self.offset.x.min(max_x), self.offset.y.min(max_y)))
    }

    /// Returns `true` if `rect` lies entirely within the viewport.
    #[must_use]
    pub fn is_rect_fully_visible(&self, rect: Rect) -> bool {
        let view = self.viewport_rect();
        rect.x0 >= view.x0 && rect.x1 <= view.x1 && rect.y0 >= view.y0 && rect.y1 <= view.y1
    }

    /// Returns `true` if `rect` overlaps the viewport at all.
    #[must_use]
    pub fn is_rect_partially_visible(&self, rect: Rect) -> bool {
        let view = self.viewport_rect();
        rect.x1 > view.x0 && rect.x0 < view.x1 && rect.y1 > view.y0 && rect.y0 < view.y1
    }

    /// Scrolls so that `rect` (virtual coordinates) is brought into view.
    ///
    /// Both axes are adjusted independently using `align`. Returns `true` if
    /// the offset changed.
    pub fn scroll_rect_into_view(&mut self, rect: Rect, align: ScrollAlign) -> bool {
        let x = align_axis(
            self.offset.x,
            self.viewport.width,
            rect.x0,
            rect.x1,
            align,
        );
        let y = align_axis(
            self.offset.y,
            self.viewport.height,
            rect.y0,
            rect.y1,
            align,
        );
        self.set_offset(Vec2::new(x, y))
    }
}

fn clamp_size(size: Size) -> Size {
    Size::new(size.width.max(0.0), size.height.max(0.0))
}

fn align_axis(current: f64, viewport: f64, start: f64, end: f64, align: ScrollAlign) -> f64 {
    let new_offset = match align {
        ScrollAlign::Start => start,
        ScrollAlign::End => end - viewport,
        ScrollAlign::Center => (start + end) / 2.0 - viewport / 2.0,
        ScrollAlign::Nearest => {
            let viewport_end = current + viewport;
            // If the item is already fully visible, keep the current offset.
            if start >= current && end <= viewport_end {
                current
            } else if start < current || end - start > viewport {
                // Above the viewport, or too large to fit: align start.
                start
            } else {
                // Below the viewport: align end.
                end - viewport
            }
        }
    };
    new_offset.max(0.0)
}
