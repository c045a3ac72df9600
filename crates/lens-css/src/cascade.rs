//! Style Cascade & Resolver
//!
//! Computes the rendering style of DOM elements by:
//! 1. Matching selectors of the sheets in the element's scope
//! 2. Sorting by importance, origin, specificity and source order
//! 3. Inheriting `visibility` along the flat tree
//!
//! Each document and shadow root is its own scope: page styles do not
//! reach into shadow trees, and shadow styles do not leak out.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::computed::ComputedStyle;
use crate::properties::{Display, PropertyValue, Visibility};
use crate::{CssParser, Declaration, Rule, Selector, Specificity, StyleError, Stylesheet};
use lens_dom::{DomTree, NodeData, NodeId};

/// Elements the user agent never renders
const UA_HIDDEN: &str = "head, script, style, link, meta, title, template, noscript, [hidden]";

/// Elements the user agent lays out as blocks
const UA_BLOCK: &str = "html, body, div, p, section, article, aside, header, footer, nav, \
                        main, form, fieldset, ul, ol, li, h1, h2, h3, h4, h5, h6, pre, \
                        blockquote, figure, figcaption, dl, dt, dd, hr, address, details, summary";

/// Cascade origin, lowest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Origin {
    UserAgent,
    Author,
    Inline,
}

/// One matched declaration with everything the cascade orders by
struct Matched<'a> {
    decl: &'a Declaration,
    origin: Origin,
    specificity: Specificity,
    order: usize,
}

impl Matched<'_> {
    fn cascade_cmp(&self, other: &Self) -> Ordering {
        self.decl
            .important
            .cmp(&other.decl.important)
            .then(self.origin.cmp(&other.origin))
            .then(self.specificity.cmp(&other.specificity))
            .then(self.order.cmp(&other.order))
    }
}

/// Style resolver - computes styles for DOM elements
#[derive(Debug)]
pub struct StyleResolver {
    /// User agent stylesheet (browser defaults)
    ua_styles: Stylesheet,
    /// Author stylesheets keyed by the document or shadow root they apply to
    scoped: HashMap<NodeId, Vec<Stylesheet>>,
    parser: CssParser,
}

impl Default for StyleResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleResolver {
    pub fn new() -> Self {
        Self {
            ua_styles: Self::default_ua_styles(),
            scoped: HashMap::new(),
            parser: CssParser::new(),
        }
    }

    /// Resolver loaded with every connected `<style>` element of the tree.
    ///
    /// Sheets that fail to parse are skipped.
    pub fn for_tree(tree: &DomTree) -> Self {
        let mut resolver = Self::new();

        for id in tree.node_ids() {
            if tree.tag_name(id) != Some("style") || !tree.is_connected(id) {
                continue;
            }
            let Some(scope) = tree.scope_root(id) else {
                continue;
            };
            match resolver.parser.parse(&tree.child_text(id)) {
                Ok(sheet) => resolver.add_stylesheet(scope, sheet),
                Err(e) => tracing::debug!(node = ?id, error = %e, "skipping style sheet"),
            }
        }

        tracing::debug!(scopes = resolver.scoped.len(), "collected author styles");
        resolver
    }

    /// Add an author stylesheet applying within `scope`
    pub fn add_stylesheet(&mut self, scope: NodeId, stylesheet: Stylesheet) {
        self.scoped.entry(scope).or_default().push(stylesheet);
    }

    /// Compute the rendering style of an element.
    ///
    /// Fails for missing nodes, non-elements and detached elements.
    pub fn compute_style(&self, tree: &DomTree, node: NodeId) -> Result<ComputedStyle, StyleError> {
        check_element(tree, node)?;

        // Ancestors first, so inherited values flow down
        let mut chain = vec![node];
        let mut current = node;
        while let Some(parent) = flat_parent(tree, current) {
            chain.push(parent);
            current = parent;
        }

        let mut visibility = Visibility::Visible;
        let mut style = ComputedStyle::default();
        for &element in chain.iter().rev() {
            style = self.cascade(tree, element, visibility);
            visibility = style.visibility;
        }
        Ok(style)
    }

    /// Compute the style of an element whose parent's `visibility` is
    /// already known.
    ///
    /// Tree walks pass the value down instead of re-cascading every
    /// ancestor for each node.
    pub fn compute_style_with(
        &self,
        tree: &DomTree,
        node: NodeId,
        inherited: Visibility,
    ) -> Result<ComputedStyle, StyleError> {
        check_element(tree, node)?;
        Ok(self.cascade(tree, node, inherited))
    }

    /// Whether an element is rendered; failures count as not rendered
    pub fn is_rendered(&self, tree: &DomTree, node: NodeId) -> bool {
        match self.compute_style(tree, node) {
            Ok(style) => style.is_rendered(),
            Err(e) => {
                tracing::trace!(error = %e, "style computation failed");
                false
            }
        }
    }

    fn cascade(&self, tree: &DomTree, node: NodeId, inherited: Visibility) -> ComputedStyle {
        let mut matches = Vec::new();
        let mut order = 0;

        Self::collect_matches(tree, node, &self.ua_styles, Origin::UserAgent, &mut order, &mut matches);

        let sheets = tree
            .scope_root(node)
            .and_then(|scope| self.scoped.get(&scope));
        for sheet in sheets.into_iter().flatten() {
            Self::collect_matches(tree, node, sheet, Origin::Author, &mut order, &mut matches);
        }

        let inline = tree
            .attr(node, "style")
            .map(|style| self.parser.parse_inline(style))
            .transpose()
            .unwrap_or_else(|e| {
                tracing::trace!(node = ?node, error = %e, "ignoring style attribute");
                None
            })
            .unwrap_or_default();
        for decl in &inline {
            order += 1;
            matches.push(Matched {
                decl,
                origin: Origin::Inline,
                specificity: Specificity::default(),
                order,
            });
        }

        matches.sort_by(Matched::cascade_cmp);

        let mut style = ComputedStyle::inheriting(inherited);
        for matched in matches {
            style.apply_declaration(matched.decl);
        }
        style
    }

    fn collect_matches<'a>(
        tree: &DomTree,
        node: NodeId,
        stylesheet: &'a Stylesheet,
        origin: Origin,
        order: &mut usize,
        matches: &mut Vec<Matched<'a>>,
    ) {
        for rule in &stylesheet.rules {
            *order += 1;
            // The most specific matching selector of a list wins
            let Some(specificity) = rule
                .selectors
                .iter()
                .filter(|s| s.matches(tree, node))
                .map(|s| s.specificity)
                .max()
            else {
                continue;
            };
            for decl in &rule.declarations {
                matches.push(Matched {
                    decl,
                    origin,
                    specificity,
                    order: *order,
                });
            }
        }
    }

    fn default_ua_styles() -> Stylesheet {
        let rule = |selectors: &str, display: Display| {
            Selector::parse_list(selectors).map(|selectors| Rule {
                selectors,
                declarations: vec![Declaration {
                    value: PropertyValue::Display(display),
                    important: false,
                }],
            })
        };

        Stylesheet {
            rules: [rule(UA_BLOCK, Display::Block), rule(UA_HIDDEN, Display::None)]
                .into_iter()
                .flatten()
                .collect(),
        }
    }
}

fn check_element(tree: &DomTree, node: NodeId) -> Result<(), StyleError> {
    let data = tree.get(node).ok_or(StyleError::InvalidNode(node))?;
    if !data.is_element() {
        return Err(StyleError::NotAnElement(node));
    }
    if !tree.is_connected(node) {
        return Err(StyleError::Detached(node));
    }
    Ok(())
}

/// Parent element in the flat tree: shadow roots lead to their host,
/// documents end the chain (a frame document does not inherit from its
/// frame element).
fn flat_parent(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    let parent = tree.parent(node)?;
    match &tree.get(parent)?.data {
        NodeData::Element(_) => Some(parent),
        NodeData::ShadowRoot(root) => Some(root.host),
        _ => None,
    }
}
