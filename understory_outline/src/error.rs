// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use alloc::string::String;
use core::fmt::Debug;

/// Contract violations reported by the outline view.
///
/// None of these are recoverable inside the engine: they signal that a
/// collaborator broke its contract. The engine reports them instead of
/// committing half-built geometry, so the next read after the source is fixed
/// starts from a clean recompute.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OutlineError<K: Debug> {
    /// The source reported `count` children for `node` but had no child at `index`.
    #[error("tree source is inconsistent: {node:?} reports {count} children but has none at index {index}")]
    InconsistentSource {
        /// The parent whose children were being walked.
        node: K,
        /// The index that yielded no child.
        index: usize,
        /// The child count the source reported.
        count: usize,
    },
}

/// Failure reported by a [`Renderer`](crate::Renderer) for one node or part.
///
/// The view logs these and continues with the next node; they never abort a
/// layout or paint pass.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("renderer fault: {message}")]
pub struct RenderFault {
    message: String,
}

impl RenderFault {
    /// Creates a fault carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message describing the fault.
    pub fn message(&self) -> &str {
        &self.message
    }
}
