// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text-mode outline over a generated tree of about fifty thousand nodes.
//!
//! Each frame is printed as a grid of characters, one row per line. Only the
//! rows that fit in the viewport are ever painted, however large the tree.
//!
//! Run:
//! - `cargo run -p understory_outline_demos`
//! - `RUST_LOG=understory_outline=debug cargo run -p understory_outline_demos` to also see
//!   layout passes, anchor moves, and selection changes.

use std::error::Error;

use kurbo::{Point, Size, Vec2};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use understory_outline::{
    Key, NodeId, OutlineConfig, OutlineError, OutlineView, Part, PointerPress, RenderFault,
    Renderer, ScrollAlign, SourceChange, TreeModel,
};

const COLUMNS: usize = 48;
const ROWS: usize = 10;

/// A fixed grid of characters; one unit of virtual space is one cell.
struct TextSurface {
    cells: Vec<Vec<char>>,
    selected_row: Option<usize>,
}

impl TextSurface {
    fn new() -> Self {
        Self {
            cells: vec![vec![' '; COLUMNS]; ROWS],
            selected_row: None,
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "positions are rounded to whole cells first"
    )]
    fn cell(origin: Point) -> Option<(usize, usize)> {
        let (x, y) = (origin.x.round(), origin.y.round());
        if x < 0.0 || y < 0.0 {
            return None;
        }
        Some((x as usize, y as usize))
    }

    fn put(&mut self, origin: Point, text: &str) {
        let Some((x, y)) = Self::cell(origin) else {
            return;
        };
        let Some(row) = self.cells.get_mut(y) else {
            return;
        };
        for (cell, c) in row.iter_mut().skip(x).zip(text.chars()) {
            *cell = c;
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for (y, row) in self.cells.iter().enumerate() {
            out.push_str(if self.selected_row == Some(y) { "> |" } else { "  |" });
            out.extend(row.iter());
            out.push_str("|\n");
        }
        out
    }
}

/// Glyphs and labels as characters.
struct Text<'a>(&'a TreeModel<String>);

impl Renderer<NodeId> for Text<'_> {
    type Surface = TextSurface;

    fn part_size(&self, _part: Part) -> Result<Size, RenderFault> {
        Ok(Size::new(1.0, 1.0))
    }

    fn label_size(&self, node: NodeId) -> Result<Size, RenderFault> {
        let label = self
            .0
            .get(node)
            .ok_or_else(|| RenderFault::new("label requested for a removed node"))?;
        Ok(Size::new(label.chars().count() as f64, 1.0))
    }

    fn paint_part(
        &self,
        part: Part,
        surface: &mut TextSurface,
        origin: Point,
        _node: NodeId,
    ) -> Result<(), RenderFault> {
        let glyph = match part {
            Part::ToggleOpen => "-",
            Part::ToggleClosed => "+",
            Part::LeafIcon => "·",
            Part::BranchOpenIcon => "o",
            Part::BranchClosedIcon => "#",
        };
        surface.put(origin, glyph);
        Ok(())
    }

    fn paint_label(
        &self,
        surface: &mut TextSurface,
        origin: Point,
        node: NodeId,
        selected: bool,
    ) -> Result<(), RenderFault> {
        let label = self
            .0
            .get(node)
            .ok_or_else(|| RenderFault::new("paint requested for a removed node"))?;
        surface.put(origin, label);
        if selected {
            surface.selected_row = TextSurface::cell(origin).map(|(_, y)| y);
        }
        Ok(())
    }
}

/// `workspace -> crate_NNN (200) -> mod_N (5) -> item_NN.rs (50)`.
fn generate() -> (TreeModel<String>, NodeId) {
    let mut model = TreeModel::new();
    let root = model.insert(None, "workspace".to_owned());
    for c in 0..200 {
        let krate = model.insert(Some(root), format!("crate_{c:03}"));
        for m in 0..5 {
            let module = model.insert(Some(krate), format!("mod_{m}"));
            for i in 0..50 {
                model.insert(Some(module), format!("item_{i:02}.rs"));
            }
        }
    }
    model.take_changes();
    (model, root)
}

fn frame(
    title: &str,
    view: &mut OutlineView<NodeId>,
    model: &TreeModel<String>,
) -> Result<(), OutlineError<NodeId>> {
    let mut surface = TextSurface::new();
    let summary = view.paint(model, &Text(model), &mut surface)?;
    println!(
        "{title} (painted {} rows, {} faults, offset {:?})",
        summary.painted,
        summary.faults,
        view.scroll().offset()
    );
    print!("{}", surface.render());
    println!();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (mut model, root) = generate();
    tracing::info!(nodes = model.len(), "generated tree");

    let config = OutlineConfig::default()
        .with_vertical_gap(0.0)
        .with_part_gap(1.0)
        .with_scroll_align(ScrollAlign::Nearest);
    let mut view = OutlineView::new(config);
    view.set_viewport_size(Size::new(COLUMNS as f64, ROWS as f64));
    view.subscribe(|event| tracing::info!(?event, "outline event"));

    let keys = [Key::Down, Key::Right, Key::Down, Key::Down, Key::Right];
    for key in keys {
        view.handle_key(&model, &Text(&model), key)?;
    }
    frame("after expanding crate_001", &mut view, &model)?;

    view.handle_key(&model, &Text(&model), Key::PageDown)?;
    view.handle_key(&model, &Text(&model), Key::PageDown)?;
    frame("two pages down", &mut view, &model)?;

    // Reveal a node deep in the tree and select it.
    let krate = model.children_of(root)[150];
    let module = model.children_of(krate)[3];
    let item = model.children_of(module)[42];
    view.expand_to(&model, item);
    view.select(&model, &Text(&model), Some(item))?;
    frame("revealed crate_150/mod_3/item_42.rs", &mut view, &model)?;

    view.scroll_by(Vec2::new(0.0, -4.0));
    view.handle_pointer_press(&model, &Text(&model), PointerPress::new(Point::new(8.0, 1.0)))?;
    frame("scrolled up and clicked the second row", &mut view, &model)?;

    model.set_value(item, "renamed_item_42.rs".to_owned());
    let doomed = model.children_of(module)[40];
    model.remove(doomed);
    for change in model.take_changes() {
        view.source_changed(change);
    }
    frame("after renaming item_42.rs and removing item_40.rs", &mut view, &model)?;

    view.source_changed(SourceChange::Reset);
    frame("after a reset", &mut view, &model)?;
    Ok(())
}
