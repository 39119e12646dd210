// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The outline view: lazily validated state plus interaction and paint.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Point, Rect, Size, Vec2};
use smallvec::SmallVec;

use crate::config::{OutlineConfig, ViewFlags};
use crate::error::{OutlineError, RenderFault};
use crate::event::{ListenerId, Listeners, OutlineEvent};
use crate::hit::HitTester;
use crate::input::{Key, PointerPress};
use crate::layout::{LayoutSummary, layout};
use crate::metrics::MetricsCache;
use crate::render::{Part, Renderer};
use crate::scroll::ScrollState;
use crate::source::{SourceChange, TreeSource, is_strict_ancestor};
use crate::traversal::{Direction, Logical};
use crate::visibility::VisibilityWindow;

/// What a paint pass did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PaintSummary {
    /// Rows visited (every row intersecting the viewport band).
    pub painted: usize,
    /// Renderer faults that were logged and skipped.
    pub faults: usize,
}

/// A virtualized outline over an external [`TreeSource`].
///
/// The view owns per-node metrics, the visibility window, the selection and
/// the scroll state. It holds no reference to the source or renderer between
/// calls: operations that need them take them as arguments, so the host stays
/// free to mutate its tree and then report the change through
/// [`OutlineView::source_changed`].
///
/// Writes only invalidate. Reads (paint, hit testing, paging, bringing a node
/// into view) validate what they depend on first: metrics, then visibility.
/// Each is recomputed at most once per invalidation.
pub struct OutlineView<K> {
    config: OutlineConfig,
    flags: ViewFlags,
    cache: MetricsCache<K>,
    window: VisibilityWindow<K>,
    scroll: ScrollState,
    selection: Option<K>,
    content_size: Size,
    listeners: Listeners<K>,
}

impl<K: Copy + Eq + Hash + Debug> Debug for OutlineView<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OutlineView")
            .field("flags", &self.flags)
            .field("records", &self.cache.len())
            .field("window", &self.window)
            .field("scroll", &self.scroll)
            .field("selection", &self.selection)
            .field("content_size", &self.content_size)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq + Hash + Debug> OutlineView<K> {
    /// Creates a view with nothing laid out.
    pub fn new(config: OutlineConfig) -> Self {
        Self {
            flags: config.initial_flags(),
            config,
            cache: MetricsCache::new(),
            window: VisibilityWindow::default(),
            scroll: ScrollState::default(),
            selection: None,
            content_size: Size::ZERO,
            listeners: Listeners::default(),
        }
    }

    /// The configuration the view was built with.
    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Current validity and behavior flags.
    pub fn flags(&self) -> ViewFlags {
        self.flags
    }

    /// Cached metrics. Only meaningful while [`ViewFlags::METRICS_VALID`] is set.
    pub fn metrics(&self) -> &MetricsCache<K> {
        &self.cache
    }

    /// Registers an event callback.
    pub fn subscribe(&mut self, callback: impl FnMut(&OutlineEvent<K>) + 'static) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    /// Removes an event callback. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// The selected node, if any.
    pub fn selection(&self) -> Option<K> {
        self.selection
    }

    /// Scroll offset and viewport size.
    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    /// Preferred content size from the most recent layout pass.
    pub fn content_size(&self) -> Size {
        self.content_size
    }

    /// Row bounds of `node` in virtual coordinates from the most recent layout.
    pub fn bounds_of(&self, node: K) -> Option<Rect> {
        self.cache.get(node).map(|m| m.bounds())
    }

    /// Effective open state of `node`.
    pub fn is_open(&self, node: K) -> bool {
        self.cache
            .is_open(node)
            .unwrap_or(self.config.default_open)
    }

    /// Anchor from the last visibility recompute; may be stale.
    pub fn anchor(&self) -> Option<K> {
        self.window.anchor()
    }

    /// Marks metrics (and therefore visibility) invalid.
    pub fn invalidate_metrics(&mut self) {
        self.flags
            .remove(ViewFlags::METRICS_VALID | ViewFlags::VISIBILITY_VALID);
    }

    /// Marks the visibility window invalid.
    pub fn invalidate_visibility(&mut self) {
        self.flags.remove(ViewFlags::VISIBILITY_VALID);
    }

    /// Applies a structural notification from the host.
    ///
    /// Must be called after the source has changed and before the next read.
    /// For [`SourceChange::Removed`] the source has already forgotten the
    /// branch, so cached descendants and the selection are found through the
    /// parent links the view learned while laying out, toggling and selecting.
    pub fn source_changed(&mut self, change: SourceChange<K>) {
        match change {
            SourceChange::Inserted(_) => {}
            SourceChange::Removed(node) => {
                if let Some(sel) = self.selection
                    && (sel == node || self.cache.recorded_ancestor(node, sel))
                {
                    self.set_selection(None);
                }
                self.window.forget_branch(node, &self.cache);
                let _evicted = self.cache.evict_branch(node);
                #[cfg(feature = "tracing")]
                tracing::debug!(node = ?node, evicted = _evicted, "branch removed");
            }
            SourceChange::Modified(node) => {
                if let Some(m) = self.cache.get_mut(node) {
                    m.label_stale = true;
                }
            }
            SourceChange::Reset => {
                self.cache.clear();
                self.window.reset();
                self.set_selection(None);
            }
        }
        self.invalidate_metrics();
    }

    /// Runs the layout pass if metrics are invalid.
    ///
    /// Returns the pass summary, or `None` if metrics were already valid. On
    /// error the metrics stay invalid.
    pub fn ensure_layout<S, R>(
        &mut self,
        source: &S,
        renderer: &R,
    ) -> Result<Option<LayoutSummary>, OutlineError<K>>
    where
        S: TreeSource<Key = K>,
        R: Renderer<K> + ?Sized,
    {
        if self.flags.contains(ViewFlags::METRICS_VALID) {
            return Ok(None);
        }
        let summary = match layout(source, renderer, &mut self.cache, &self.config) {
            Ok(summary) => summary,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::error!(error = %err, "layout aborted");
                return Err(err);
            }
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            visited = summary.visited,
            labels_measured = summary.labels_measured,
            faults = summary.faults,
            width = summary.content_size.width,
            height = summary.content_size.height,
            "layout pass"
        );
        self.flags.insert(ViewFlags::METRICS_VALID);
        self.flags.remove(ViewFlags::VISIBILITY_VALID);

        if summary.content_size != self.content_size {
            self.content_size = summary.content_size;
            self.listeners
                .emit(&OutlineEvent::ContentSizeChanged(summary.content_size));
        }
        if self.scroll.clamp_to_content(self.content_size) {
            self.emit_scroll();
        }
        Ok(Some(summary))
    }

    /// Validates metrics, then the visibility window for the current viewport.
    /// Returns the anchor.
    pub fn ensure_visibility<S, R>(
        &mut self,
        source: &S,
        renderer: &R,
    ) -> Result<Option<K>, OutlineError<K>>
    where
        S: TreeSource<Key = K>,
        R: Renderer<K> + ?Sized,
    {
        self.ensure_layout(source, renderer)?;
        let viewport = self.scroll.viewport_rect();
        if self.flags.contains(ViewFlags::VISIBILITY_VALID) && self.window.viewport() == viewport {
            return Ok(self.window.anchor());
        }
        let logical = Logical::new(source, &self.cache, self.config.default_open);
        self.window.recompute(
            &logical,
            source,
            &self.cache,
            viewport,
            self.content_size.height,
        );
        self.flags.insert(ViewFlags::VISIBILITY_VALID);
        Ok(self.window.anchor())
    }

    /// Next node in logical order.
    pub fn next<S: TreeSource<Key = K>>(&self, source: &S, node: K) -> Option<K> {
        self.logical(source).next(node)
    }

    /// Previous node in logical order.
    pub fn prev<S: TreeSource<Key = K>>(&self, source: &S, node: K) -> Option<K> {
        self.logical(source).prev(node)
    }

    /// Last node of the logical subtree rooted at `node`.
    pub fn last<S: TreeSource<Key = K>>(&self, source: &S, node: K) -> K {
        self.logical(source).last(node)
    }

    /// The node one viewport height away from `node`. Validates metrics.
    pub fn next_page<S, R>(
        &mut self,
        source: &S,
        renderer: &R,
        node: K,
        direction: Direction,
    ) -> Result<K, OutlineError<K>>
    where
        S: TreeSource<Key = K>,
        R: Renderer<K> + ?Sized,
    {
        self.ensure_layout(source, renderer)?;
        let page = self.scroll.viewport_size().height;
        Ok(self
            .logical(source)
            .next_page(node, direction, page, self.config.vertical_gap))
    }

    /// Flips the open state of `node`.
    ///
    /// When `node` closes over the current selection, the selection moves to
    /// `node`. Emits [`OutlineEvent::Toggled`] after any selection change.
    pub fn toggle<S: TreeSource<Key = K>>(&mut self, source: &S, node: K) {
        self.cache.link_ancestors(source, node);
        let m = self.cache.entry(node, self.config.default_open);
        m.is_open = !m.is_open;
        let open = m.is_open;
        #[cfg(feature = "tracing")]
        tracing::debug!(node = ?node, open, "toggled");

        if !open
            && let Some(sel) = self.selection
            && is_strict_ancestor(source, node, sel)
        {
            self.set_selection(Some(node));
        }
        self.invalidate_metrics();
        self.listeners.emit(&OutlineEvent::Toggled(node));
    }

    /// Opens every closed ancestor of `node`. Returns how many were opened.
    pub fn expand_to<S: TreeSource<Key = K>>(&mut self, source: &S, node: K) -> usize {
        let mut closed: SmallVec<[K; 16]> = SmallVec::new();
        let mut current = source.parent(node);
        while let Some(p) = current {
            if !self.is_open(p) {
                closed.push(p);
            }
            current = source.parent(p);
        }
        // Outermost first, so notifications follow reading order.
        for &p in closed.iter().rev() {
            self.toggle(source, p);
        }
        closed.len()
    }

    /// Changes the selection and brings the new node into view.
    ///
    /// Returns `false` without doing anything if selection is disabled or
    /// `node` is already selected. Emits one
    /// [`OutlineEvent::SelectionChanged`] per distinct value.
    pub fn select<S, R>(
        &mut self,
        source: &S,
        renderer: &R,
        node: Option<K>,
    ) -> Result<bool, OutlineError<K>>
    where
        S: TreeSource<Key = K>,
        R: Renderer<K> + ?Sized,
    {
        if !self.flags.contains(ViewFlags::SELECTION_ENABLED) || node == self.selection {
            return Ok(false);
        }
        self.set_selection(node);
        if let Some(node) = node {
            // Lets a later removal of any ancestor find the selection.
            self.cache.link_ancestors(source, node);
            self.scroll_into_view(source, renderer, node)?;
        }
        Ok(true)
    }

    /// Scrolls so `node`'s row is visible. Returns `true` if the offset moved.
    ///
    /// Hidden nodes have no row and are left alone.
    pub fn scroll_into_view<S, R>(
        &mut self,
        source: &S,
        renderer: &R,
        node: K,
    ) -> Result<bool, OutlineError<K>>
    where
        S: TreeSource<Key = K>,
        R: Renderer<K> + ?Sized,
    {
        self.ensure_layout(source, renderer)?;
        if self.logical(source).is_hidden(node) {
            return Ok(false);
        }
        let Some(rect) = self.bounds_of(node) else {
            return Ok(false);
        };
        let moved = self
            .scroll
            .scroll_rect_into_view(rect, self.config.scroll_align);
        if moved {
            self.emit_scroll();
        }
        Ok(moved)
    }

    /// Enables or disables selection. Disabling clears the selection.
    pub fn set_selection_enabled(&mut self, enabled: bool) {
        self.flags.set(ViewFlags::SELECTION_ENABLED, enabled);
        if !enabled {
            self.set_selection(None);
        }
    }

    /// Shows or hides connector lines.
    pub fn set_show_lines(&mut self, show: bool) {
        self.flags.set(ViewFlags::SHOW_LINES, show);
    }

    /// Sets the scroll offset. Returns `true` if it changed.
    ///
    /// While metrics are valid the offset is also clamped to the content.
    pub fn set_scroll_offset(&mut self, offset: Vec2) -> bool {
        let mut moved = self.scroll.set_offset(offset);
        if self.flags.contains(ViewFlags::METRICS_VALID) {
            moved |= self.scroll.clamp_to_content(self.content_size);
        }
        if moved {
            self.emit_scroll();
        }
        moved
    }

    /// Adjusts the scroll offset by `delta`. Returns `true` if it changed.
    pub fn scroll_by(&mut self, delta: Vec2) -> bool {
        self.set_scroll_offset(self.scroll.offset() + delta)
    }

    /// Sets the viewport size. Returns `true` if it changed.
    pub fn set_viewport_size(&mut self, size: Size) -> bool {
        let changed = self.scroll.set_viewport_size(size);
        if changed {
            self.invalidate_visibility();
        }
        changed
    }

    /// The node under `position` (viewport coordinates), if any.
    pub fn hit_test<S, R>(
        &mut self,
        source: &S,
        renderer: &R,
        position: Point,
    ) -> Result<Option<K>, OutlineError<K>>
    where
        S: TreeSource<Key = K>,
        R: Renderer<K> + ?Sized,
    {
        let anchor = self.ensure_visibility(source, renderer)?;
        let point = position + self.scroll.offset();
        Ok(HitTester::new(source, &self.cache, point).locate(anchor))
    }

    /// Toggles on the toggle glyph, selects right of it.
    ///
    /// Returns `true` if the press did either.
    pub fn handle_pointer_press<S, R>(
        &mut self,
        source: &S,
        renderer: &R,
        press: PointerPress,
    ) -> Result<bool, OutlineError<K>>
    where
        S: TreeSource<Key = K>,
        R: Renderer<K> + ?Sized,
    {
        let Some(node) = self.hit_test(source, renderer, press.position)? else {
            return Ok(false);
        };
        let point = press.position + self.scroll.offset();
        let Some(m) = self.cache.get(node) else {
            return Ok(false);
        };
        let on_toggle = source.has_children(node) && m.toggle_bounds().contains(point);
        let right_of_toggle = point.x >= m.toggle_right();
        if on_toggle {
            self.toggle(source, node);
            Ok(true)
        } else if right_of_toggle {
            self.select(source, renderer, Some(node))
        } else {
            Ok(false)
        }
    }

    /// Applies a keyboard command. Returns `true` if it changed anything.
    pub fn handle_key<S, R>(
        &mut self,
        source: &S,
        renderer: &R,
        key: Key,
    ) -> Result<bool, OutlineError<K>>
    where
        S: TreeSource<Key = K>,
        R: Renderer<K> + ?Sized,
    {
        let Some(current) = self.selection else {
            if key.is_toggle() {
                return Ok(false);
            }
            return self.select(source, renderer, source.root());
        };
        let branch = source.has_children(current);
        let open = self.is_open(current);

        let target = match key {
            Key::Up => self.prev(source, current),
            Key::Down => self.next(source, current),
            Key::Home => source.root(),
            Key::End => source.root().map(|root| self.last(source, root)),
            Key::PageUp => Some(self.next_page(source, renderer, current, Direction::Backward)?),
            Key::PageDown => Some(self.next_page(source, renderer, current, Direction::Forward)?),
            Key::Right if branch && !open => {
                self.toggle(source, current);
                return Ok(true);
            }
            Key::Right => self.next(source, current),
            Key::Left if branch && open => {
                self.toggle(source, current);
                return Ok(true);
            }
            Key::Left => source.parent(current),
            Key::Expand | Key::Collapse => {
                if open == (key == Key::Collapse) {
                    self.toggle(source, current);
                    return Ok(true);
                }
                return Ok(false);
            }
        };
        match target {
            Some(node) if node != current => self.select(source, renderer, Some(node)),
            _ => Ok(false),
        }
    }

    /// Paints every row that intersects the viewport's vertical band.
    ///
    /// Starts at the anchor and stops at the first row below the viewport, so
    /// the work is proportional to what is visible. Renderer faults are logged,
    /// counted, and skipped.
    pub fn paint<S, R>(
        &mut self,
        source: &S,
        renderer: &R,
        surface: &mut R::Surface,
    ) -> Result<PaintSummary, OutlineError<K>>
    where
        S: TreeSource<Key = K>,
        R: Renderer<K> + ?Sized,
    {
        let anchor = self.ensure_visibility(source, renderer)?;
        let offset = self.scroll.offset();
        let bottom = self.scroll.viewport_rect().y1;
        let lines = self.flags.contains(ViewFlags::SHOW_LINES);
        let part_gap = self.config.part_gap;
        let logical = self.logical(source);

        let mut summary = PaintSummary::default();
        let mut check = |result: Result<(), RenderFault>, _node: K| {
            if let Err(_fault) = result {
                #[cfg(feature = "tracing")]
                tracing::warn!(node = ?_node, fault = %_fault, "renderer failed to paint; skipped");
                summary.faults += 1;
            }
        };

        let mut painted = 0;
        let mut next = anchor;
        while let Some(node) = next {
            let Some(m) = self.cache.get(node) else {
                break;
            };
            if m.origin.y >= bottom {
                break;
            }
            let origin = m.origin - offset;
            let branch = source.has_children(node);

            if lines
                && let Some(p) = source.parent(node)
                && let Some(pm) = self.cache.get(p)
            {
                let x = pm.origin.x + pm.toggle_size.width / 2.0 - offset.x;
                let top = pm.bounds().y1 - offset.y;
                let mid = origin.y + m.size.height / 2.0;
                check(renderer.paint_connector(surface, Point::new(x, top), Point::new(x, mid)), node);
                check(
                    renderer.paint_connector(surface, Point::new(x, mid), Point::new(origin.x, mid)),
                    node,
                );
            }

            let mut x = origin.x;
            if branch {
                let toggle = Point::new(x, origin.y);
                check(renderer.paint_part(Part::toggle(m.is_open), surface, toggle, node), node);
                x += advance(m.toggle_size, part_gap);
            }
            let icon = Point::new(x, origin.y);
            check(
                renderer.paint_part(Part::icon(branch, m.is_open), surface, icon, node),
                node,
            );
            x += advance(m.icon_size, part_gap);
            let label = Point::new(x, origin.y);
            check(
                renderer.paint_label(surface, label, node, self.selection == Some(node)),
                node,
            );

            painted += 1;
            next = logical.next_visible(node);
        }
        summary.painted = painted;
        Ok(summary)
    }

    fn logical<'a, S: TreeSource<Key = K>>(&'a self, source: &'a S) -> Logical<'a, S> {
        Logical::new(source, &self.cache, self.config.default_open)
    }

    fn set_selection(&mut self, node: Option<K>) {
        if node == self.selection {
            return;
        }
        self.selection = node;
        #[cfg(feature = "tracing")]
        tracing::debug!(selection = ?node, "selection changed");
        self.listeners.emit(&OutlineEvent::SelectionChanged(node));
    }

    fn emit_scroll(&mut self) {
        self.invalidate_visibility();
        self.listeners
            .emit(&OutlineEvent::ScrollChanged(self.scroll.offset()));
    }
}

/// Horizontal space taken by a row part; empty parts take none.
fn advance(size: Size, part_gap: f64) -> f64 {
    if size.width > 0.0 {
        size.width + part_gap
    } else {
        0.0
    }
}
