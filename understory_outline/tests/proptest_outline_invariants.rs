// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property-based invariant tests for the outline view.
//!
//! Verifies, over random trees and random open states:
//! 1. Traversal round trip: `next(prev(n)) == n` for every node in the logical tree
//! 2. Toggling a node twice restores every record that existed before
//! 3. Layout places children below their parent and rows in increasing `y`
//! 4. The content size covers every row
//! 5. Hit testing the centre of any row finds it; points outside all rows find nothing

mod common;

use common::{Boxes, from_parent_picks};
use kurbo::{Point, Size};
use proptest::prelude::*;
use understory_outline::{NodeId, OutlineConfig, OutlineView, TreeModel, TreeSource};

// ── Strategy helpers ──────────────────────────────────────────────────

/// Parent picks for up to 40 non-root nodes, plus indices of nodes to toggle.
fn arb_tree() -> impl Strategy<Value = (Vec<usize>, Vec<usize>, bool)> {
    (
        prop::collection::vec(0_usize..64, 0..40),
        prop::collection::vec(0_usize..64, 0..8),
        any::<bool>(),
    )
}

struct Setup {
    model: TreeModel<usize>,
    ids: Vec<NodeId>,
    view: OutlineView<NodeId>,
}

fn setup(parents: &[usize], toggles: &[usize], default_open: bool) -> Setup {
    let (model, ids) = from_parent_picks(parents);
    let mut view = OutlineView::new(OutlineConfig::default().with_default_open(default_open));
    // The root stays open so there is something to walk.
    if !view.is_open(ids[0]) {
        view.toggle(&model, ids[0]);
    }
    for &t in toggles {
        let node = ids[t % ids.len()];
        if node != ids[0] {
            view.toggle(&model, node);
        }
    }
    Setup { model, ids, view }
}

/// Nodes of the logical tree in row order.
fn rows(s: &Setup) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut next = s.model.root();
    while let Some(n) = next {
        out.push(n);
        next = s.view.next(&s.model, n);
    }
    out
}

// ── Properties ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn next_inverts_prev((parents, toggles, open) in arb_tree()) {
        let s = setup(&parents, &toggles, open);
        for n in rows(&s) {
            if let Some(p) = s.view.prev(&s.model, n) {
                prop_assert_eq!(s.view.next(&s.model, p), Some(n));
            }
        }
    }

    #[test]
    fn double_toggle_is_idempotent((parents, toggles, open) in arb_tree(), pick in 0_usize..64) {
        let mut s = setup(&parents, &toggles, open);
        let r = Boxes;
        s.view.ensure_layout(&s.model, &r).unwrap();
        let visible = rows(&s);
        let node = visible[pick % visible.len()];
        // Records that existed before; opening a fresh branch may add more.
        let before: Vec<_> = s
            .ids
            .iter()
            .filter_map(|&n| s.view.metrics().get(n).cloned().map(|m| (n, m)))
            .collect();
        let size = s.view.content_size();

        s.view.toggle(&s.model, node);
        s.view.ensure_layout(&s.model, &r).unwrap();
        s.view.toggle(&s.model, node);
        s.view.ensure_layout(&s.model, &r).unwrap();

        for (n, m) in &before {
            prop_assert_eq!(s.view.metrics().get(*n), Some(m));
        }
        prop_assert_eq!(s.view.content_size(), size);
    }

    #[test]
    fn layout_is_monotonic_in_row_order((parents, toggles, open) in arb_tree()) {
        let mut s = setup(&parents, &toggles, open);
        s.view.ensure_layout(&s.model, &Boxes).unwrap();
        let content = s.view.content_size();
        let mut last_y = f64::NEG_INFINITY;
        for n in rows(&s) {
            let b = s.view.bounds_of(n).unwrap();
            prop_assert!(b.y0 > last_y, "rows must advance downward");
            last_y = b.y0;
            prop_assert!(b.x1 <= content.width && b.y1 <= content.height);
            if let Some(p) = s.model.parent(n) {
                let pb = s.view.bounds_of(p).unwrap();
                prop_assert!(b.y0 >= pb.y1, "child starts below its parent");
                prop_assert!(b.x0 >= pb.x0, "child is indented");
            }
        }
    }

    #[test]
    fn hit_testing_is_sound((parents, toggles, open) in arb_tree()) {
        let mut s = setup(&parents, &toggles, open);
        let r = Boxes;
        s.view.ensure_layout(&s.model, &r).unwrap();
        let content = s.view.content_size();
        s.view.set_viewport_size(Size::new(content.width + 100.0, content.height + 100.0));

        for n in rows(&s) {
            let centre = s.view.bounds_of(n).unwrap().center();
            prop_assert_eq!(s.view.hit_test(&s.model, &r, centre).unwrap(), Some(n));
        }
        let outside = Point::new(content.width + 10.0, 5.0);
        prop_assert_eq!(s.view.hit_test(&s.model, &r, outside).unwrap(), None);
        let below = Point::new(5.0, content.height + 10.0);
        prop_assert_eq!(s.view.hit_test(&s.model, &r, below).unwrap(), None);
    }
}
