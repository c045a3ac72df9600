//! Element paths
//!
//! XPath-like location strings: `//*[@id="..."]` for elements with an
//! id, `/html/body` for a document body, and indexed steps below those.
//! Paths are recomputed on every call. Duplicate ids give ambiguous
//! paths.

use lens_dom::{DomTree, NodeId};

use crate::visitor::{frame_content, FrameContent, Visitor};

/// Fixed path of a document body
pub const BODY_PATH: &str = "/html/body";

/// Compute the path of an element.
///
/// Detached elements and non-elements give the empty string. Steps stop
/// at the first non-element ancestor (document or shadow root), which
/// contributes nothing.
pub fn element_path(tree: &DomTree, node: NodeId) -> String {
    let mut steps = Vec::new();
    let mut current = node;

    let prefix = loop {
        let Some(tag) = tree.tag_name(current) else {
            break String::new();
        };
        if let Some(id) = tree.attr(current, "id").filter(|id| !id.is_empty()) {
            break id_path(id);
        }
        if tree.is_body(current) {
            break BODY_PATH.to_string();
        }
        let Some(parent) = tree.parent(current) else {
            break String::new();
        };
        steps.push(format!("{}[{}]", tag, same_tag_ordinal(tree, current)));
        current = parent;
    };

    steps.iter().rev().fold(prefix, |mut path, step| {
        path.push('/');
        path.push_str(step);
        path
    })
}

fn id_path(id: &str) -> String {
    format!("//*[@id=\"{}\"]", id)
}

/// 1-based position among element siblings with the same tag
fn same_tag_ordinal(tree: &DomTree, node: NodeId) -> usize {
    let Some(tag) = tree.tag_name(node) else {
        return 0;
    };
    let Some(parent) = tree.parent(node) else {
        return 1;
    };
    tree.children(parent)
        .filter(|&(id, _)| tree.tag_name(id) == Some(tag))
        .position(|(id, _)| id == node)
        .map_or(0, |p| p + 1)
}

/// Find the element a path produced by [`element_path`] points at.
///
/// Id shortcuts search the whole reachable forest (shadow trees and
/// same-origin frames included) in tree order. Paths without a prefix
/// start at the main document.
pub fn resolve_path(tree: &DomTree, path: &str) -> Option<NodeId> {
    let (start, rest) = if let Some(after) = path.strip_prefix("//*[@id=\"") {
        let end = after.find("\"]")?;
        let id = &after[..end];
        (find_by_id(tree, id)?, &after[end + 2..])
    } else if let Some(rest) = path.strip_prefix(BODY_PATH) {
        (tree.body(tree.root())?, rest)
    } else {
        (tree.root(), path)
    };

    rest.split('/')
        .filter(|s| !s.is_empty())
        .try_fold(start, |node, step| {
            let (tag, index) = parse_step(step)?;
            tree.children(node)
                .filter(|&(id, _)| tree.tag_name(id) == Some(tag))
                .nth(index.checked_sub(1)?)
                .map(|(id, _)| id)
        })
}

fn parse_step(step: &str) -> Option<(&str, usize)> {
    let (tag, index) = step.strip_suffix(']')?.split_once('[')?;
    Some((tag, index.parse().ok()?))
}

fn find_by_id(tree: &DomTree, target: &str) -> Option<NodeId> {
    let mut visitor = Visitor::new();
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        if !visitor.enter(node) {
            continue;
        }
        if tree.attr(node, "id") == Some(target) {
            return Some(node);
        }
        stack.extend(tree.child_ids(node).into_iter().rev());
        if tree.is_frame(node)
            && let FrameContent::Body(body) = frame_content(tree, node)
        {
            stack.push(body);
        }
        if let Some(shadow) = tree.shadow_root(node) {
            stack.extend(tree.child_ids(shadow).into_iter().rev());
        }
    }
    None
}
