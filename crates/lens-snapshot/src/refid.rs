//! Ref-ID simplified tree
//!
//! Turns the live DOM into a compact tree of visible, meaningful
//! elements, each carrying the marker written by the assignment pass so
//! an agent can address it later.

use lens_css::{StyleResolver, Visibility};
use lens_dom::{DomTree, NodeId};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::visitor::{effective_children, frame_content, FrameContent, Visitor};

/// Tags never emitted, whatever their content
pub const IGNORED_TAGS: &[&str] = &[
    "script", "style", "meta", "link", "head", "br", "hr", "svg", "path",
];

/// Attributes copied into the output, in this order
pub const CURATED_ATTRIBUTES: &[&str] = &[
    "id",
    "class",
    "href",
    "src",
    "placeholder",
    "aria-label",
    "role",
    "type",
    "alt",
    "title",
    "name",
    "value",
];

/// Interactive tags kept even when empty
pub const ALWAYS_KEEP: &[&str] = &["button", "a", "input", "select", "textarea", "option"];

/// Attribute flagging a frame whose document could not be entered
pub const CROSS_ORIGIN_FLAG: &str = "cross-origin";

/// Value of a simplified attribute
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    Flag(bool),
}

/// Insertion-ordered attribute map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, AttrValue)>);

impl Attributes {
    pub fn insert(&mut self, name: impl Into<String>, value: AttrValue) {
        self.0.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One element of the ref-id tree
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SimplifiedNode {
    pub tag: String,
    /// Marker as a string, `null` when the element was never marked
    pub ref_id: Option<String>,
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SimplifiedNode>,
}

impl SimplifiedNode {
    fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.text.is_none() && self.children.is_empty()
    }
}

/// Result of visiting one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Keep(SimplifiedNode),
    /// Pruned after its children were considered
    Omit,
    /// Filtered before recursion; nothing below was looked at
    OmitSubtree,
}

impl Outcome {
    pub fn into_node(self) -> Option<SimplifiedNode> {
        match self {
            Self::Keep(node) => Some(node),
            Self::Omit | Self::OmitSubtree => None,
        }
    }
}

/// Build the ref-id tree rooted at `node`
pub fn build_ref_tree(tree: &DomTree, styles: &StyleResolver, node: NodeId) -> Option<SimplifiedNode> {
    RefTreeBuilder::new(tree, styles).visit(node).into_node()
}

/// Pass-scoped builder state
pub struct RefTreeBuilder<'a> {
    tree: &'a DomTree,
    styles: &'a StyleResolver,
    visitor: Visitor,
}

impl<'a> RefTreeBuilder<'a> {
    pub fn new(tree: &'a DomTree, styles: &'a StyleResolver) -> Self {
        Self {
            tree,
            styles,
            visitor: Visitor::new(),
        }
    }

    /// Visit a node and everything it leads to
    pub fn visit(&mut self, node: NodeId) -> Outcome {
        self.visit_inheriting(node, None)
    }

    /// `inherited` is the parent's computed `visibility` when the walk
    /// came from it; `None` resolves the ancestors from scratch.
    fn visit_inheriting(&mut self, node: NodeId, inherited: Option<Visibility>) -> Outcome {
        let tree = self.tree;
        if !self.visitor.enter(node) {
            return Outcome::OmitSubtree;
        }

        let Some(tag) = tree.tag_name(node) else {
            return Outcome::OmitSubtree;
        };
        if IGNORED_TAGS.contains(&tag) {
            return Outcome::OmitSubtree;
        }
        let computed = match inherited {
            Some(visibility) => self.styles.compute_style_with(tree, node, visibility),
            None => self.styles.compute_style(tree, node),
        };
        let style = match computed {
            Ok(style) if style.is_rendered() => style,
            Ok(_) => {
                tracing::trace!(node = ?node, tag, "omitting invisible element");
                return Outcome::OmitSubtree;
            }
            Err(e) => {
                tracing::trace!(node = ?node, error = %e, "style computation failed");
                return Outcome::OmitSubtree;
            }
        };

        let mut simplified = SimplifiedNode {
            tag: tag.to_string(),
            ref_id: tree.marker(node).map(|m| m.to_string()),
            attributes: curated_attributes(tree, node),
            text: direct_text(tree, node),
            children: Vec::new(),
        };

        for child in effective_children(tree, node) {
            if let Outcome::Keep(child) = self.visit_inheriting(child, Some(style.visibility)) {
                simplified.children.push(child);
            }
        }

        if tree.is_frame(node) {
            match frame_content(tree, node) {
                // Frame documents do not inherit from the frame element
                FrameContent::Body(body) => {
                    if let Outcome::Keep(body) = self.visit(body) {
                        simplified.children.push(body);
                    }
                }
                FrameContent::Denied => {
                    simplified
                        .attributes
                        .insert(CROSS_ORIGIN_FLAG, AttrValue::Flag(true));
                }
                FrameContent::Empty => {}
            }
        }

        if simplified.is_empty() && !ALWAYS_KEEP.contains(&tag) {
            return Outcome::Omit;
        }
        Outcome::Keep(simplified)
    }
}

fn curated_attributes(tree: &DomTree, node: NodeId) -> Attributes {
    let mut attributes = Attributes::default();
    for &name in CURATED_ATTRIBUTES {
        if let Some(value) = tree.attr(node, name) {
            attributes.insert(name, AttrValue::Text(value.to_string()));
        }
    }
    attributes
}

/// Trimmed direct text children joined by single spaces
fn direct_text(tree: &DomTree, node: NodeId) -> Option<String> {
    let parts: Vec<&str> = tree
        .children(node)
        .filter_map(|(_, n)| n.as_text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}
