//! Boundary-safe node visitor
//!
//! Shared by every pass: a per-pass visited set, the effective child list
//! of a node, and frame content resolution that never propagates access
//! failures.

use std::collections::HashSet;

use lens_dom::{DomTree, FrameAccessError, NodeId};

/// What a frame element leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameContent {
    /// Accessible frame document with a body
    Body(NodeId),
    /// No document loaded, or the document has no body
    Empty,
    /// Document exists but belongs to another origin
    Denied,
}

/// Per-pass traversal context
#[derive(Debug, Default)]
pub struct Visitor {
    visited: HashSet<NodeId>,
}

impl Visitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a node visited; false if this pass has already seen it
    pub fn enter(&mut self, node: NodeId) -> bool {
        self.visited.insert(node)
    }

    /// Number of nodes entered so far
    pub fn visited(&self) -> usize {
        self.visited.len()
    }
}

/// Children of the shadow root when the node hosts one, else its own
/// children
pub fn effective_children(tree: &DomTree, node: NodeId) -> Vec<NodeId> {
    match tree.shadow_root(node) {
        Some(shadow) => tree.child_ids(shadow),
        None => tree.child_ids(node),
    }
}

/// Resolve a frame element to its document body.
///
/// Non-frames and frames without content are `Empty`; only an origin
/// mismatch is `Denied`.
pub fn frame_content(tree: &DomTree, frame: NodeId) -> FrameContent {
    match tree.try_access_frame(frame) {
        Ok(document) => tree
            .body(document)
            .map(FrameContent::Body)
            .unwrap_or(FrameContent::Empty),
        Err(FrameAccessError::CrossOrigin { origin, .. }) => {
            tracing::debug!(frame = ?frame, %origin, "frame access denied");
            FrameContent::Denied
        }
        Err(e) => {
            tracing::trace!(error = %e, "frame has no content");
            FrameContent::Empty
        }
    }
}
