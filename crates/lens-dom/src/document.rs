//! Document - High-level document API

use crate::{DomError, DomTree, NodeId};

/// HTML Document backed by a DOM forest
#[derive(Debug)]
pub struct Document {
    /// The DOM forest (main document plus frames and shadow roots)
    tree: DomTree,
}

impl Document {
    /// Create a document with an empty html/head/body skeleton
    pub fn new(url: &str) -> Result<Self, DomError> {
        let mut tree = DomTree::with_url(url);

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        tree.append_child(tree.root(), html)?;
        tree.append_child(html, head)?;
        tree.append_child(html, body)?;

        Ok(Self { tree })
    }

    /// Create a document with no structure
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::with_url(url),
        }
    }

    /// Wrap an existing tree
    pub fn from_tree(tree: DomTree) -> Self {
        Self { tree }
    }

    /// Main document node
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        self.tree
            .get(self.root())
            .and_then(|n| n.as_document())
            .map(|d| d.url.as_str())
            .unwrap_or("")
    }

    /// Get document title
    pub fn title(&self) -> String {
        let Some(head) = self.head() else {
            return String::new();
        };

        self.tree
            .children(head)
            .find(|&(id, _)| self.tree.tag_name(id) == Some("title"))
            .map(|(id, _)| self.tree.child_text(id).trim().to_string())
            .unwrap_or_default()
    }

    /// Get `<html>` element
    pub fn document_element(&self) -> Option<NodeId> {
        self.tree.document_element(self.root())
    }

    /// Get `<head>` element
    pub fn head(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.tree
            .children(html)
            .find(|&(id, _)| self.tree.tag_name(id) == Some("head"))
            .map(|(id, _)| id)
    }

    /// Get `<body>` element
    pub fn body(&self) -> Option<NodeId> {
        self.tree.body(self.root())
    }

    /// First element in the light tree with the given `id` attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.find_element_with_id(self.root(), id)
    }

    fn find_element_with_id(&self, start: NodeId, target: &str) -> Option<NodeId> {
        for (node_id, _) in self.tree.children(start) {
            if self.tree.attr(node_id, "id") == Some(target) {
                return Some(node_id);
            }
            if let Some(found) = self.find_element_with_id(node_id, target) {
                return Some(found);
            }
        }
        None
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty("about:blank")
    }
}
