//! Path-keyed simplified tree
//!
//! Every element becomes a key `tag + ordinal` (0-based per tag, counted
//! across one pass) whose value holds its path and, merged into the same
//! object, the keys of its children. No visibility filtering and no frame
//! recursion.

use std::collections::HashMap;

use lens_dom::{DomTree, NodeId};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::visitor::{effective_children, Visitor};
use crate::xpath::element_path;

/// Tags left out of the path tree
pub const PATH_IGNORED_TAGS: &[&str] = &["script", "style", "meta", "link", "head"];

/// Next ordinal per tag for one pass
#[derive(Debug, Default)]
pub struct TagCounters(HashMap<String, usize>);

impl TagCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current ordinal of `tag`, then advance it
    pub fn next(&mut self, tag: &str) -> usize {
        let counter = self.0.entry(tag.to_string()).or_insert(0);
        let current = *counter;
        *counter += 1;
        current
    }
}

/// Value of one key: the path, then the children in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNode {
    pub xpath: String,
    pub children: Vec<PathEntry>,
}

/// A single `key: value` pair of the path tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    pub key: String,
    pub node: PathNode,
}

impl Serialize for PathNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.children.len() + 1))?;
        map.serialize_entry("xpath", &self.xpath)?;
        for child in &self.children {
            map.serialize_entry(&child.key, &child.node)?;
        }
        map.end()
    }
}

impl Serialize for PathEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.node)?;
        map.end()
    }
}

/// Build the path tree rooted at `node`
pub fn build_path_tree(tree: &DomTree, node: NodeId, counters: &mut TagCounters) -> Option<PathEntry> {
    let mut visitor = Visitor::new();
    visit(tree, node, counters, &mut visitor)
}

fn visit(
    tree: &DomTree,
    node: NodeId,
    counters: &mut TagCounters,
    visitor: &mut Visitor,
) -> Option<PathEntry> {
    if !visitor.enter(node) {
        return None;
    }
    let tag = tree.tag_name(node)?;
    if PATH_IGNORED_TAGS.contains(&tag) {
        return None;
    }

    let key = format!("{}{}", tag, counters.next(tag));
    let xpath = element_path(tree, node);
    let children = effective_children(tree, node)
        .into_iter()
        .filter_map(|child| visit(tree, child, counters, visitor))
        .collect();

    Some(PathEntry {
        key,
        node: PathNode { xpath, children },
    })
}
