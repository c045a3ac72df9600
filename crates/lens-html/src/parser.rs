//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it into the lens-dom arena.
//! Declarative shadow roots and frame documents are resolved during
//! conversion so the result is one connected forest.

use crate::{FrameLoader, ParseError};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use lens_dom::{Document, DomTree, NodeId, ShadowRootMode};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use url::Url;

/// Frames nested deeper than this are left without a document
const DEFAULT_MAX_FRAME_DEPTH: usize = 8;

/// HTML5 parser
pub struct HtmlParser {
    loader: Option<Box<dyn FrameLoader>>,
    max_frame_depth: usize,
}

impl HtmlParser {
    /// Create a parser that only loads `srcdoc` frames
    pub fn new() -> Self {
        Self {
            loader: None,
            max_frame_depth: DEFAULT_MAX_FRAME_DEPTH,
        }
    }

    /// Load `<iframe src>` documents through `loader`
    pub fn with_loader(mut self, loader: impl FrameLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Limit frame nesting
    pub fn max_frame_depth(mut self, depth: usize) -> Self {
        self.max_frame_depth = depth;
        self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, ParseError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a document URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, ParseError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let mut tree = DomTree::with_url(url);
        let root = tree.root();
        let base = Url::parse(url).ok();
        self.load_into(&mut tree, root, html, base.as_ref(), 0)?;

        tracing::debug!("Parsed {} nodes", tree.len());
        Ok(Document::from_tree(tree))
    }

    /// Parse `html` and append its nodes under `document`
    fn load_into(
        &self,
        tree: &mut DomTree,
        document: NodeId,
        html: &str,
        base: Option<&Url>,
        depth: usize,
    ) -> Result<(), ParseError> {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        self.convert_node(&dom.document, tree, document, base, depth)
    }

    /// Convert an RcDom node into the arena
    fn convert_node(
        &self,
        handle: &Handle,
        tree: &mut DomTree,
        parent: NodeId,
        base: Option<&Url>,
        depth: usize,
    ) -> Result<(), ParseError> {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent, base, depth)?;
                }
            }
            RcNodeData::Doctype { name, .. } => {
                let id = tree.create_doctype(name);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                if !text.trim().is_empty() {
                    let id = tree.create_text(&text);
                    tree.append_child(parent, id)?;
                }
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let tag: &str = &name.local;

                if tag == "template" {
                    let mode = attrs
                        .borrow()
                        .iter()
                        .find(|a| &*a.name.local == "shadowrootmode")
                        .and_then(|a| ShadowRootMode::parse(&a.value));
                    let can_host = tree.is_element(parent) && tree.shadow_root(parent).is_none();

                    if let (Some(mode), true) = (mode, can_host) {
                        let shadow = tree.attach_shadow(parent, mode)?;
                        if let Some(contents) = template_contents.borrow().as_ref() {
                            for child in contents.children.borrow().iter() {
                                self.convert_node(child, tree, shadow, base, depth)?;
                            }
                        }
                        return Ok(());
                    }
                }

                let id = tree.create_element(tag);
                for attr in attrs.borrow().iter() {
                    tree.set_attr(id, &attr.name.local, &attr.value)?;
                }
                tree.append_child(parent, id)?;

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id, base, depth)?;
                }

                if tag == "iframe" {
                    self.load_frame(tree, id, base, depth)?;
                }
            }
            RcNodeData::ProcessingInstruction { .. } => {}
        }
        Ok(())
    }

    /// Load the document of an `iframe` from `srcdoc` or the frame loader
    fn load_frame(
        &self,
        tree: &mut DomTree,
        iframe: NodeId,
        base: Option<&Url>,
        depth: usize,
    ) -> Result<(), ParseError> {
        if depth >= self.max_frame_depth {
            tracing::warn!(depth, "frame nesting limit reached, leaving frame empty");
            return Ok(());
        }

        if let Some(srcdoc) = tree.attr(iframe, "srcdoc").map(str::to_owned) {
            // srcdoc documents inherit the embedding document's origin
            let Some(origin) = tree
                .containing_document(iframe)
                .and_then(|doc| tree.get(doc))
                .and_then(|n| n.as_document())
                .map(|d| d.origin.clone())
            else {
                return Ok(());
            };
            let document = tree.create_document("about:srcdoc", origin);
            self.load_into(tree, document, &srcdoc, base, depth + 1)?;
            tree.set_content_document(iframe, document)?;
            return Ok(());
        }

        let Some(loader) = self.loader.as_deref() else {
            return Ok(());
        };
        let Some(src) = tree.attr(iframe, "src").filter(|s| !s.trim().is_empty()) else {
            return Ok(());
        };

        let url = match base {
            Some(base) => base.join(src),
            None => Url::parse(src),
        };
        let url = match url {
            Ok(url) => url,
            Err(err) => {
                tracing::debug!(src, %err, "unresolvable frame URL");
                return Ok(());
            }
        };

        let Some(html) = loader.load(&url) else {
            tracing::debug!(%url, "no document for frame");
            return Ok(());
        };

        let document = tree.create_document(url.as_str(), url.origin());
        self.load_into(tree, document, &html, Some(&url), depth + 1)?;
        tree.set_content_document(iframe, document)?;
        Ok(())
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}
