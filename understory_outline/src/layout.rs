// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout pass: positions and sizes for every node of the logical tree.

use alloc::vec;
use kurbo::{Point, Size};

use crate::config::OutlineConfig;
use crate::error::{OutlineError, RenderFault};
use crate::metrics::MetricsCache;
use crate::render::{Part, Renderer};
use crate::source::TreeSource;

/// What a layout pass produced.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutSummary {
    /// Preferred (virtual) content size: the maximum right and bottom edges.
    pub content_size: Size,
    /// Nodes placed during the pass.
    pub visited: usize,
    /// Labels whose size was (re)queried from the renderer.
    pub labels_measured: usize,
    /// Renderer faults tolerated during the pass.
    pub faults: usize,
}

/// Sizes of the shared parts, queried once per pass.
struct PartSizes {
    toggle_open: Size,
    toggle_closed: Size,
    leaf_icon: Size,
    branch_open_icon: Size,
    branch_closed_icon: Size,
}

impl PartSizes {
    fn query<K, R: Renderer<K> + ?Sized>(renderer: &R, faults: &mut usize) -> Self {
        let mut size = |part| tolerate(renderer.part_size(part), faults);
        Self {
            toggle_open: size(Part::ToggleOpen),
            toggle_closed: size(Part::ToggleClosed),
            leaf_icon: size(Part::LeafIcon),
            branch_open_icon: size(Part::BranchOpenIcon),
            branch_closed_icon: size(Part::BranchClosedIcon),
        }
    }

    fn get(&self, part: Part) -> Size {
        match part {
            Part::ToggleOpen => self.toggle_open,
            Part::ToggleClosed => self.toggle_closed,
            Part::LeafIcon => self.leaf_icon,
            Part::BranchOpenIcon => self.branch_open_icon,
            Part::BranchClosedIcon => self.branch_closed_icon,
        }
    }
}

fn tolerate(result: Result<Size, RenderFault>, faults: &mut usize) -> Size {
    match result {
        Ok(size) => Size::new(size.width.max(0.0), size.height.max(0.0)),
        Err(_fault) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(fault = %_fault, "renderer failed to report a size; using zero");
            *faults += 1;
            Size::ZERO
        }
    }
}

enum Visit<K> {
    Enter { node: K, parent: Option<K>, x: f64 },
    Exit(K),
}

/// Lays out the logical tree of `source` into `cache`.
///
/// Walks depth-first from the root. Each node is placed at the running `y`
/// cursor, which then advances by the node's height plus the vertical gap;
/// children of an open node are indented to the node's toggle right edge.
/// Closed nodes get a record, but their children are skipped, and records of
/// nodes the pass does not reach drop out of sight. Labels are only measured
/// for records that are new or marked stale.
///
/// On an inconsistent source the pass stops and reports the error; the
/// caller must keep treating the cache as invalid.
pub(crate) fn layout<S, R>(
    source: &S,
    renderer: &R,
    cache: &mut MetricsCache<S::Key>,
    config: &OutlineConfig,
) -> Result<LayoutSummary, OutlineError<S::Key>>
where
    S: TreeSource,
    R: Renderer<S::Key> + ?Sized,
{
    let mut summary = LayoutSummary {
        content_size: Size::ZERO,
        visited: 0,
        labels_measured: 0,
        faults: 0,
    };
    cache.begin_pass();
    let Some(root) = source.root() else {
        return Ok(summary);
    };

    let parts = PartSizes::query(renderer, &mut summary.faults);
    let gap = config.vertical_gap;
    let part_gap = config.part_gap;
    let mut cursor_y = 0.0_f64;
    let mut max = Point::ZERO;

    let mut stack = vec![Visit::Enter {
        node: root,
        parent: None,
        x: 0.0,
    }];
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter { node, parent, x } => {
                let has_children = source.has_children(node);
                let m = cache.visit(node, parent, config.default_open);
                let open = m.is_open;
                if m.label_stale {
                    m.view_size = tolerate(renderer.label_size(node), &mut summary.faults);
                    m.label_stale = false;
                    summary.labels_measured += 1;
                }

                let toggle = if has_children {
                    parts.get(Part::toggle(open))
                } else {
                    Size::ZERO
                };
                let icon = parts.get(Part::icon(has_children, open));
                let row = [toggle, icon, m.view_size];
                let filled = row.iter().filter(|s| s.width > 0.0).count();
                let width = row.iter().map(|s| s.width).sum::<f64>()
                    + part_gap * filled.saturating_sub(1) as f64;
                let height = row.iter().map(|s| s.height).fold(0.0, f64::max);

                m.origin = Point::new(x, cursor_y);
                m.size = Size::new(width, height);
                m.toggle_size = toggle;
                m.icon_size = icon;

                max.x = max.x.max(x + width);
                max.y = max.y.max(cursor_y + height);
                cursor_y += height + gap;
                summary.visited += 1;

                stack.push(Visit::Exit(node));
                if open && has_children {
                    let count = source.child_count(node);
                    let child_x = x + toggle.width;
                    // Pushed in reverse so children are visited in source order.
                    for index in (0..count).rev() {
                        let child = source.child_at(node, index).ok_or(
                            OutlineError::InconsistentSource { node, index, count },
                        )?;
                        stack.push(Visit::Enter {
                            node: child,
                            parent: Some(node),
                            x: child_x,
                        });
                    }
                }
            }
            Visit::Exit(node) => {
                if let Some(m) = cache.get_mut(node) {
                    m.branch_bottom = cursor_y - gap;
                }
            }
        }
    }

    summary.content_size = Size::new(max.x, max.y);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedRenderer, Fixture};

    #[test]
    fn rows_stack_with_gap_and_children_indent() {
        // root -> a, b; a -> a1, a2 (all open)
        let fx = Fixture::sample();
        let renderer = FixedRenderer::default();
        let mut cache = MetricsCache::new();
        let config = OutlineConfig::default()
            .with_default_open(true)
            .with_vertical_gap(2.0)
            .with_part_gap(4.0);

        let summary = layout(&fx, &renderer, &mut cache, &config).unwrap();
        assert_eq!(summary.visited, 5);
        assert_eq!(summary.labels_measured, 5);

        let ys: alloc::vec::Vec<f64> = [0, 1, 3, 4, 2]
            .iter()
            .map(|&n| cache.get(n).unwrap().origin.y)
            .collect();
        // Preorder root, a, a1, a2, b with 20 tall rows and a 2 unit gap.
        assert_eq!(ys, [0.0, 22.0, 44.0, 66.0, 88.0]);

        let root = cache.get(0).unwrap();
        let a = cache.get(1).unwrap();
        let a1 = cache.get(3).unwrap();
        let b = cache.get(2).unwrap();
        // Branch: toggle 10 + gap 4 + icon 16 + gap 4 + label.
        assert_eq!(root.size.width, 10.0 + 4.0 + 16.0 + 4.0 + 40.0);
        // Leaf: icon 16 + gap 4 + label (no toggle, no gap for it).
        assert_eq!(b.size.width, 16.0 + 4.0 + 40.0);
        assert_eq!(a.origin.x, root.toggle_right());
        assert_eq!(a1.origin.x, a.toggle_right());
        assert_eq!(a.branch_bottom, 86.0);
        assert_eq!(root.branch_bottom, 108.0);
        assert_eq!(summary.content_size.height, 108.0);
    }

    #[test]
    fn closed_nodes_get_records_but_hide_children() {
        let fx = Fixture::sample();
        let renderer = FixedRenderer::default();
        let mut cache = MetricsCache::new();
        let config = OutlineConfig::default().with_default_open(false);
        cache.entry(0, false).is_open = true;

        let summary = layout(&fx, &renderer, &mut cache, &config).unwrap();
        // root (open), a (closed), b.
        assert_eq!(summary.visited, 3);
        assert!(cache.get(1).is_some());
        assert!(cache.get(3).is_none());
        assert_eq!(cache.get(2).unwrap().origin.y, 44.0);
    }

    #[test]
    fn labels_are_measured_once_until_stale() {
        let fx = Fixture::sample();
        let renderer = FixedRenderer::default();
        let mut cache = MetricsCache::new();
        let config = OutlineConfig::default().with_default_open(true);

        layout(&fx, &renderer, &mut cache, &config).unwrap();
        assert_eq!(renderer.label_queries.get(), 5);
        let again = layout(&fx, &renderer, &mut cache, &config).unwrap();
        assert_eq!(again.labels_measured, 0);
        assert_eq!(renderer.label_queries.get(), 5);

        cache.get_mut(2).unwrap().label_stale = true;
        let stale = layout(&fx, &renderer, &mut cache, &config).unwrap();
        assert_eq!(stale.labels_measured, 1);
        assert_eq!(renderer.label_queries.get(), 6);
    }

    #[test]
    fn collapsing_hides_descendant_records_until_reopened() {
        let fx = Fixture::sample();
        let renderer = FixedRenderer::default();
        let mut cache = MetricsCache::new();
        let config = OutlineConfig::default().with_default_open(true);

        layout(&fx, &renderer, &mut cache, &config).unwrap();
        let a1 = cache.get(3).cloned().unwrap();

        cache.get_mut(1).unwrap().is_open = false;
        let collapsed = layout(&fx, &renderer, &mut cache, &config).unwrap();
        assert_eq!(collapsed.visited, 3);
        assert_eq!(cache.len(), 3);
        assert!(cache.get(3).is_none());
        assert!(cache.get(4).is_none());
        // b moves up into a1's old row; nothing else claims it.
        assert_eq!(cache.get(2).unwrap().origin.y, 44.0);

        cache.get_mut(1).unwrap().is_open = true;
        let reopened = layout(&fx, &renderer, &mut cache, &config).unwrap();
        assert_eq!(reopened.labels_measured, 0);
        assert_eq!(cache.len(), 5);
        assert_eq!(cache.get(3), Some(&a1));
    }

    #[test]
    fn renderer_faults_degrade_to_zero_size() {
        let fx = Fixture::sample();
        let renderer = FixedRenderer {
            failing_label: Some(2),
            ..FixedRenderer::default()
        };
        let mut cache = MetricsCache::new();
        let config = OutlineConfig::default().with_default_open(true);

        let summary = layout(&fx, &renderer, &mut cache, &config).unwrap();
        assert_eq!(summary.faults, 1);
        assert_eq!(summary.visited, 5);
        assert_eq!(cache.get(2).unwrap().view_size, Size::ZERO);
        // Siblings are unaffected.
        assert_eq!(cache.get(1).unwrap().view_size, Size::new(40.0, 20.0));
    }

    #[test]
    fn inconsistent_source_is_reported() {
        let mut fx = Fixture::sample();
        fx.lie_about_children(1, 5);
        let renderer = FixedRenderer::default();
        let mut cache = MetricsCache::new();
        let config = OutlineConfig::default().with_default_open(true);

        let err = layout(&fx, &renderer, &mut cache, &config).unwrap_err();
        assert_eq!(
            err,
            OutlineError::InconsistentSource {
                node: 1,
                index: 4,
                count: 5
            }
        );
    }
}
