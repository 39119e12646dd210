// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction-time configuration and runtime view flags.

use crate::scroll::ScrollAlign;

bitflags::bitflags! {
    /// Validity and behavior flags of an [`OutlineView`](crate::OutlineView).
    ///
    /// The two validity flags are independent: metrics can be valid while the
    /// visibility window is stale (after a scroll), and invalidating metrics
    /// always invalidates visibility too.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ViewFlags: u8 {
        /// Cached node metrics reflect the current source and open states.
        const METRICS_VALID     = 0b0000_0001;
        /// The visibility anchor reflects the current viewport and metrics.
        const VISIBILITY_VALID  = 0b0000_0010;
        /// `select` is honored.
        const SELECTION_ENABLED = 0b0000_0100;
        /// Paint asks the renderer for connector lines.
        const SHOW_LINES        = 0b0000_1000;
    }
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self::SELECTION_ENABLED
    }
}

/// Configuration for an [`OutlineView`](crate::OutlineView).
#[derive(Clone, Debug, PartialEq)]
pub struct OutlineConfig {
    /// Open state given to every node the view has not seen before.
    pub default_open: bool,
    /// Vertical space between consecutive rows.
    pub vertical_gap: f64,
    /// Horizontal space between non-empty parts of a row (toggle, icon, label).
    pub part_gap: f64,
    /// Whether selection starts enabled.
    pub selection_enabled: bool,
    /// Whether connector lines start shown.
    pub show_lines: bool,
    /// Alignment used when a newly selected node is brought into view.
    pub scroll_align: ScrollAlign,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            default_open: false,
            vertical_gap: 2.0,
            part_gap: 4.0,
            selection_enabled: true,
            show_lines: false,
            scroll_align: ScrollAlign::Nearest,
        }
    }
}

impl OutlineConfig {
    /// Sets the initial open state of newly discovered nodes.
    #[must_use]
    pub fn with_default_open(mut self, open: bool) -> Self {
        self.default_open = open;
        self
    }

    /// Sets the vertical gap between rows; negative values are clamped to zero.
    #[must_use]
    pub fn with_vertical_gap(mut self, gap: f64) -> Self {
        self.vertical_gap = gap.max(0.0);
        self
    }

    /// Sets the gap between row parts; negative values are clamped to zero.
    #[must_use]
    pub fn with_part_gap(mut self, gap: f64) -> Self {
        self.part_gap = gap.max(0.0);
        self
    }

    /// Sets whether selection starts enabled.
    #[must_use]
    pub fn with_selection_enabled(mut self, enabled: bool) -> Self {
        self.selection_enabled = enabled;
        self
    }

    /// Sets whether connector lines start shown.
    #[must_use]
    pub fn with_show_lines(mut self, show: bool) -> Self {
        self.show_lines = show;
        self
    }

    /// Sets the alignment used to bring a selection into view.
    #[must_use]
    pub fn with_scroll_align(mut self, align: ScrollAlign) -> Self {
        self.scroll_align = align;
        self
    }

    pub(crate) fn initial_flags(&self) -> ViewFlags {
        let mut flags = ViewFlags::empty();
        flags.set(ViewFlags::SELECTION_ENABLED, self.selection_enabled);
        flags.set(ViewFlags::SHOW_LINES, self.show_lines);
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_clamp_gaps_and_seed_flags() {
        let config = OutlineConfig::default()
            .with_vertical_gap(-3.0)
            .with_part_gap(6.0)
            .with_selection_enabled(false)
            .with_show_lines(true);
        assert_eq!(config.vertical_gap, 0.0);
        assert_eq!(config.part_gap, 6.0);

        let flags = config.initial_flags();
        assert!(flags.contains(ViewFlags::SHOW_LINES));
        assert!(!flags.contains(ViewFlags::SELECTION_ENABLED));
        assert!(!flags.intersects(ViewFlags::METRICS_VALID | ViewFlags::VISIBILITY_VALID));
    }
}
