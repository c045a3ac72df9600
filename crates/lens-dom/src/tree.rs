//! DOM Tree (arena-based allocation)

use crate::node::{DocumentData, ElementData, Node, NodeData};
use crate::{DomError, InternedString, NodeId, ShadowRootData, ShadowRootMode, StringInterner};
use url::{Origin, Url};

/// Arena-based DOM forest.
///
/// Index 0 is always the main document. Frame documents and shadow roots
/// are further parentless nodes in the same arena.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    interner: StringInterner,
}

impl DomTree {
    /// Create a tree whose main document is `about:blank`
    pub fn new() -> Self {
        Self::with_url("about:blank")
    }

    /// Create a tree whose main document has the given URL
    pub fn with_url(url: &str) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            interner: StringInterner::new(),
        };
        tree.create_document(url, origin_of(url));
        tree
    }

    /// Main document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Name interner
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Mutable name interner
    pub fn interner_mut(&mut self) -> &mut StringInterner {
        &mut self.interner
    }

    /// Resolve an interned name
    #[inline]
    pub fn resolve(&self, name: InternedString) -> &str {
        self.interner.get(name)
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a parentless document node (used for frame content)
    pub fn create_document(&mut self, url: &str, origin: Origin) -> NodeId {
        self.push(NodeData::Document(DocumentData {
            url: url.to_string(),
            origin,
        }))
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let name = self.interner.intern(&tag.to_ascii_lowercase());
        self.push(NodeData::Element(ElementData::new(name)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_string()))
    }

    /// Create a detached doctype
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(NodeData::Doctype {
            name: name.to_string(),
        })
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_node = self.get(parent).ok_or(DomError::InvalidNode(parent))?;
        let child_node = self.get(child).ok_or(DomError::InvalidNode(child))?;

        let parent_ok = matches!(
            parent_node.data,
            NodeData::Document(_) | NodeData::Element(_) | NodeData::ShadowRoot(_)
        );
        let child_ok = !matches!(
            child_node.data,
            NodeData::Document(_) | NodeData::ShadowRoot(_)
        );
        if !parent_ok || !child_ok || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        self.unlink(child);

        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
        Ok(())
    }

    /// Remove `child` from `parent`. The node stays in the arena, detached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let node = self.get(child).ok_or(DomError::InvalidNode(child))?;
        if node.parent != parent {
            return Err(DomError::NotAChild { parent, child });
        }
        self.unlink(child);
        Ok(())
    }

    fn unlink(&mut self, child: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[child.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[child.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Whether `ancestor` is `node` or one of its ancestors, across shadow hosts
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while let Some(n) = self.get(current) {
            if current == ancestor {
                return true;
            }
            current = match &n.data {
                NodeData::ShadowRoot(s) => s.host,
                _ => n.parent,
            };
        }
        false
    }

    /// Set an attribute on an element
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = self.interner.intern(&name.to_ascii_lowercase());
        self.element_mut(id)?.set_attr(name, value.to_string());
        Ok(())
    }

    /// Remove an attribute from an element
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let Some(name) = self.interner.lookup(&name.to_ascii_lowercase()) else {
            return Ok(None);
        };
        Ok(self.element_mut(id)?.remove_attr(name))
    }

    /// Attach a shadow root to an element
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> Result<NodeId, DomError> {
        if self.element(host)?.shadow_root.is_some() {
            return Err(DomError::ShadowRootExists(host));
        }
        let shadow = self.push(NodeData::ShadowRoot(ShadowRootData::new(host, mode)));
        self.element_mut(host)?.shadow_root = Some(shadow);
        Ok(shadow)
    }

    /// Load `document` into a frame element
    pub fn set_content_document(&mut self, frame: NodeId, document: NodeId) -> Result<(), DomError> {
        if !self.get(document).is_some_and(|n| n.as_document().is_some()) {
            return Err(DomError::NotADocument(document));
        }
        if !self.is_frame(frame) {
            return Err(DomError::NotAFrame(frame));
        }
        self.element_mut(frame)?.content_document = Some(document);
        Ok(())
    }

    /// Stamp an identity marker onto an element
    pub fn set_marker(&mut self, id: NodeId, marker: u32) -> Result<(), DomError> {
        self.element_mut(id)?.ref_marker = Some(marker);
        Ok(())
    }

    fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        self.get(id)
            .ok_or(DomError::InvalidNode(id))?
            .as_element()
            .ok_or(DomError::NotAnElement(id))
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        self.get_mut(id)
            .ok_or(DomError::InvalidNode(id))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Iterate over the normal (light) children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let first = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children {
            tree: self,
            next: first,
        }
    }

    /// Every node ID in the arena, in creation order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Nearest enclosing document or shadow root, without crossing hosts.
    ///
    /// This is the scope that style sheets and selectors apply within.
    pub fn scope_root(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let node = self.get(current)?;
            if matches!(node.data, NodeData::Document(_) | NodeData::ShadowRoot(_)) {
                return Some(current);
            }
            current = self.parent(current)?;
        }
    }

    /// Snapshot of a node's child IDs, safe to hold across mutation
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).map(|(child, _)| child).collect()
    }

    /// Parent node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Check if a node is an element
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Lowercase tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        let elem = self.get(id)?.as_element()?;
        Some(self.resolve(elem.name))
    }

    /// Attribute value of an element
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        let elem = self.get(id)?.as_element()?;
        let name = self.interner.lookup(name)?;
        elem.get_attr(name)
    }

    /// Check whether an element carries an attribute
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Text content of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_text()
    }

    /// Concatenated text of the direct text children
    pub fn child_text(&self, id: NodeId) -> String {
        self.children(id).filter_map(|(_, n)| n.as_text()).collect()
    }

    /// Shadow root hosted by an element
    pub fn shadow_root(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.as_element()?.shadow_root
    }

    /// Host element of a shadow root
    pub fn shadow_host(&self, id: NodeId) -> Option<NodeId> {
        Some(self.get(id)?.as_shadow_root()?.host)
    }

    /// Whether an element is a frame (`iframe`)
    pub fn is_frame(&self, id: NodeId) -> bool {
        self.tag_name(id) == Some("iframe")
    }

    /// Document the node is connected to, crossing shadow boundaries.
    ///
    /// `None` means the node is detached.
    pub fn containing_document(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let node = self.get(current)?;
            current = match &node.data {
                NodeData::Document(_) => return Some(current),
                NodeData::ShadowRoot(s) => s.host,
                _ => node.parent,
            };
            if !current.is_valid() {
                return None;
            }
        }
    }

    /// Whether the node is connected to some document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.containing_document(id).is_some()
    }

    /// `<html>` element of a document
    pub fn document_element(&self, document: NodeId) -> Option<NodeId> {
        self.get(document)?.as_document()?;
        self.children(document)
            .find(|(_, n)| n.is_element())
            .map(|(id, _)| id)
    }

    /// `<body>` element of a document
    pub fn body(&self, document: NodeId) -> Option<NodeId> {
        let html = self.document_element(document)?;
        self.children(html)
            .find(|&(id, _)| self.tag_name(id) == Some("body"))
            .map(|(id, _)| id)
    }

    /// Whether the element is the body of the document containing it
    pub fn is_body(&self, id: NodeId) -> bool {
        self.tag_name(id) == Some("body")
            && self
                .containing_document(id)
                .and_then(|doc| self.body(doc))
                == Some(id)
    }

    /// Identity marker of an element
    pub fn marker(&self, id: NodeId) -> Option<u32> {
        self.get(id)?.as_element()?.ref_marker
    }

    /// Connected element carrying `marker`.
    ///
    /// Detached nodes may keep stale markers from earlier passes, so they
    /// are never returned.
    pub fn find_by_marker(&self, marker: u32) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.as_element().and_then(|e| e.ref_marker) == Some(marker))
            .map(|(idx, _)| NodeId(idx as u32))
            .find(|&id| self.is_connected(id))
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Origin of a URL; unparsable URLs get a fresh opaque origin
pub fn origin_of(url: &str) -> Origin {
    Url::parse(url)
        .map(|u| u.origin())
        .unwrap_or_else(|_| Origin::new_opaque())
}

/// Iterator over the light children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_iterate() {
        let mut tree = DomTree::new();
        let div = tree.create_element("DIV");
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, a).unwrap();
        tree.append_child(div, b).unwrap();

        assert_eq!(tree.tag_name(div), Some("div"));
        assert_eq!(tree.child_ids(div), vec![a, b]);
        assert_eq!(tree.parent(b), Some(div));
    }

    #[test]
    fn test_append_moves_node() {
        let mut tree = DomTree::new();
        let first = tree.create_element("div");
        let second = tree.create_element("div");
        let child = tree.create_element("span");
        tree.append_child(first, child).unwrap();
        tree.append_child(second, child).unwrap();

        assert!(tree.child_ids(first).is_empty());
        assert_eq!(tree.child_ids(second), vec![child]);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        let inner = tree.create_element("div");
        tree.append_child(outer, inner).unwrap();

        assert_eq!(
            tree.append_child(inner, outer),
            Err(DomError::HierarchyRequest { parent: inner, child: outer })
        );
    }

    #[test]
    fn test_remove_middle_child() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        let items: Vec<_> = (0..3).map(|_| tree.create_element("li")).collect();
        for &li in &items {
            tree.append_child(ul, li).unwrap();
        }
        tree.remove_child(ul, items[1]).unwrap();

        assert_eq!(tree.child_ids(ul), vec![items[0], items[2]]);
        assert_eq!(tree.parent(items[1]), None);
    }

    #[test]
    fn test_containing_document_crosses_shadow() {
        let mut tree = DomTree::new();
        let host = tree.create_element("x-card");
        tree.append_child(tree.root(), host).unwrap();
        let shadow = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let inner = tree.create_element("button");
        tree.append_child(shadow, inner).unwrap();

        assert_eq!(tree.containing_document(inner), Some(tree.root()));
        assert_eq!(tree.shadow_host(shadow), Some(host));
        assert_eq!(tree.parent(shadow), None);
    }

    #[test]
    fn test_second_shadow_root_rejected() {
        let mut tree = DomTree::new();
        let host = tree.create_element("div");
        tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
        assert_eq!(
            tree.attach_shadow(host, ShadowRootMode::Closed),
            Err(DomError::ShadowRootExists(host))
        );
    }

    #[test]
    fn test_find_by_marker_skips_detached() {
        let mut tree = DomTree::new();
        let kept = tree.create_element("div");
        let stale = tree.create_element("div");
        tree.append_child(tree.root(), kept).unwrap();
        tree.set_marker(stale, 7).unwrap();
        tree.set_marker(kept, 7).unwrap();

        assert_eq!(tree.find_by_marker(7), Some(kept));
        assert_eq!(tree.find_by_marker(8), None);
    }
}
