// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Outline: a virtualized, lazily laid out tree view engine.
//!
//! An outline shows a hierarchy as indented rows, each with an optional expand/collapse toggle,
//! an icon, and a label. This crate computes and caches the geometry of those rows over an
//! externally owned tree and keeps paint, hit testing, and keyboard navigation proportional to
//! what is on screen rather than to the size of the tree.
//!
//! - The tree is read through the [`TreeSource`] capability trait; the engine never owns or
//!   mutates nodes and refers to them by a stable key.
//! - Row visuals come from a pluggable [`Renderer`]. Label sizes are measured once per node and
//!   cached until the host reports the node as modified.
//! - [`OutlineView`] owns the per-node [`Metrics`], the [`VisibilityWindow`], the selection,
//!   and the [`ScrollState`], and emits [`OutlineEvent`]s to subscribers.
//!
//! ## Compute on read, invalidate on write
//!
//! Writes (toggling, structural notifications, scrolling, resizing) only clear validity flags
//! ([`ViewFlags::METRICS_VALID`] and [`ViewFlags::VISIBILITY_VALID`]). Reads (paint, hit
//! testing, paging, bringing a node into view) validate metrics first and then the visibility
//! window, each at most once per invalidation.
//!
//! The visibility window's anchor is the first node in logical order whose row reaches into
//! the viewport. Rows are laid out in preorder, so everything visible comes at or after it:
//! paint walks forward from the anchor until it passes the bottom edge, and the hit tester
//! searches the anchor's branch and then the later siblings along its ancestor chain.
//!
//! ## Logical tree
//!
//! Traversal ([`OutlineView::next`], [`OutlineView::prev`], [`OutlineView::last`],
//! [`OutlineView::next_page`]) treats every closed node as a leaf and never lands on a node
//! hidden under a closed ancestor.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use understory_outline::{
//!     Key, NodeId, OutlineConfig, OutlineView, Part, RenderFault, Renderer, TreeModel,
//! };
//!
//! struct Rows<'a>(&'a TreeModel<&'static str>);
//!
//! impl Renderer<NodeId> for Rows<'_> {
//!     type Surface = Vec<String>;
//!
//!     fn part_size(&self, _part: Part) -> Result<Size, RenderFault> {
//!         Ok(Size::new(8.0, 8.0))
//!     }
//!
//!     fn label_size(&self, node: NodeId) -> Result<Size, RenderFault> {
//!         let text = self.0.get(node).ok_or_else(|| RenderFault::new("stale node"))?;
//!         Ok(Size::new(8.0 * text.len() as f64, 16.0))
//!     }
//!
//!     fn paint_part(
//!         &self,
//!         _part: Part,
//!         _surface: &mut Vec<String>,
//!         _origin: Point,
//!         _node: NodeId,
//!     ) -> Result<(), RenderFault> {
//!         Ok(())
//!     }
//!
//!     fn paint_label(
//!         &self,
//!         surface: &mut Vec<String>,
//!         _origin: Point,
//!         node: NodeId,
//!         selected: bool,
//!     ) -> Result<(), RenderFault> {
//!         let text = self.0.get(node).copied().unwrap_or("?");
//!         surface.push(format!("{}{text}", if selected { "> " } else { "" }));
//!         Ok(())
//!     }
//! }
//!
//! let mut model = TreeModel::new();
//! let root = model.insert(None, "root");
//! let docs = model.insert(Some(root), "docs");
//! model.insert(Some(docs), "guide.md");
//! model.insert(Some(root), "Cargo.toml");
//!
//! let mut view = OutlineView::new(OutlineConfig::default().with_default_open(true));
//! view.set_viewport_size(Size::new(320.0, 240.0));
//! let renderer = Rows(&model);
//!
//! // With nothing selected the first key press selects the root.
//! view.handle_key(&model, &renderer, Key::Down)?;
//! view.handle_key(&model, &renderer, Key::Down)?;
//! assert_eq!(view.selection(), Some(docs));
//!
//! let mut lines = Vec::new();
//! view.paint(&model, &renderer, &mut lines)?;
//! assert_eq!(lines, ["root", "> docs", "guide.md", "Cargo.toml"]);
//! # Ok::<(), understory_outline::OutlineError<NodeId>>(())
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod error;
mod event;
mod hit;
mod input;
mod layout;
mod metrics;
mod model;
mod render;
mod scroll;
mod source;
mod traversal;
mod view;
mod visibility;

#[cfg(test)]
mod testing;

pub use config::{OutlineConfig, ViewFlags};
pub use error::{OutlineError, RenderFault};
pub use event::{ListenerId, Listeners, OutlineEvent};
pub use input::{Key, PointerPress};
pub use layout::LayoutSummary;
pub use metrics::{Metrics, MetricsCache};
pub use model::{NodeId, TreeModel};
pub use render::{Part, Renderer};
pub use scroll::{ScrollAlign, ScrollState};
pub use source::{SourceChange, TreeSource};
pub use traversal::{Direction, Logical};
pub use view::{OutlineView, PaintSummary};
pub use visibility::VisibilityWindow;
