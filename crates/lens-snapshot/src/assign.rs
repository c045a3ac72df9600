//! Identity assignment pass
//!
//! Stamps every reachable element with the next counter value, in
//! depth-first pre-order. For each element the order is: the element
//! itself, its shadow tree, the body of an accessible frame document,
//! then its light children. Light children of shadow hosts are still
//! marked even though the ref-id tree never shows them.

use lens_dom::{DomTree, NodeId};

use crate::visitor::{effective_children, frame_content, FrameContent, Visitor};

/// Assign markers starting at `start`; returns one past the last value.
///
/// A missing root is a no-op. Cross-origin frame content is never
/// marked. Earlier markers on nodes this pass does not reach are left
/// in place. The counter does not wrap: once `u32::MAX` is stamped the
/// pass stops and returns `u32::MAX`.
pub fn assign_ref_ids(tree: &mut DomTree, root: NodeId, start: u32) -> u32 {
    let mut visitor = Visitor::new();
    let mut next = start;

    if tree.get(root).is_none() {
        tracing::debug!(root = ?root, "no root to assign from");
        return next;
    }

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if !visitor.enter(node) {
            continue;
        }

        if !tree.is_element(node) {
            stack.extend(tree.child_ids(node).into_iter().rev());
            continue;
        }

        if let Err(e) = tree.set_marker(node, next) {
            tracing::trace!(error = %e, "cannot mark node");
            continue;
        }
        next = match next.checked_add(1) {
            Some(n) => n,
            None => {
                tracing::warn!(node = ?node, "marker space exhausted, stopping");
                break;
            }
        };

        // Pushed in reverse so they pop in visiting order
        stack.extend(tree.child_ids(node).into_iter().rev());
        if tree.is_frame(node)
            && let FrameContent::Body(body) = frame_content(tree, node)
        {
            stack.push(body);
        }
        if tree.shadow_root(node).is_some() {
            stack.extend(effective_children(tree, node).into_iter().rev());
        }
    }

    tracing::debug!(assigned = next - start, visited = visitor.visited(), "assigned markers");
    next
}
