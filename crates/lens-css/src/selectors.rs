//! CSS Selectors
//!
//! Parses serialized selector text into compound steps and matches them
//! right-to-left against the DOM. Matching never leaves the node's scope
//! (document or shadow root).
//!
//! Supported: type, universal, `#id`, `.class`, attribute selectors with
//! all operators, `:first-child`, `:last-child`, `:only-child`, `:empty`,
//! `:root`, and the four combinators. Anything else makes the selector
//! unparsable, so its rule is skipped rather than over-applied.

use crate::Specificity;
use lens_dom::{DomTree, NodeData, NodeId};

/// Attribute selector operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    Exists,
    Equals,
    Includes,
    DashMatch,
    StartsWith,
    EndsWith,
    Contains,
}

/// Relation between a compound and the one to its left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Root,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: AttrOp,
    value: String,
}

/// Compound selector (`div.card[open]`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
    pseudo: Vec<PseudoClass>,
}

/// Complex selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub text: String,
    pub specificity: Specificity,
    /// Left-to-right compounds; the combinator links to the previous one
    steps: Vec<(Combinator, Compound)>,
}

impl Selector {
    /// Parse a comma-separated selector list.
    ///
    /// Returns `None` if any selector in the list is unsupported.
    pub fn parse_list(text: &str) -> Option<Vec<Selector>> {
        split_top_level(text, ',')
            .into_iter()
            .map(|part| Selector::parse(part.trim()))
            .collect()
    }

    /// Parse a single complex selector
    pub fn parse(text: &str) -> Option<Selector> {
        let mut steps = Vec::new();
        let mut pending = Combinator::Descendant;
        let mut chars = text.trim().chars().peekable();

        loop {
            skip_whitespace(&mut chars);
            let Some(&c) = chars.peek() else {
                break;
            };

            let explicit = match c {
                '>' => Some(Combinator::Child),
                '+' => Some(Combinator::NextSibling),
                '~' => Some(Combinator::SubsequentSibling),
                _ => None,
            };
            if let Some(comb) = explicit {
                if steps.is_empty() {
                    return None;
                }
                chars.next();
                pending = comb;
                continue;
            }

            let compound = parse_compound(&mut chars)?;
            steps.push((pending, compound));
            pending = Combinator::Descendant;
        }

        if steps.is_empty() {
            return None;
        }

        let specificity = steps.iter().fold(Specificity::default(), |acc, (_, c)| {
            Specificity(
                acc.0 + c.ids.len() as u32,
                acc.1 + (c.classes.len() + c.attrs.len() + c.pseudo.len()) as u32,
                acc.2 + u32::from(c.tag.is_some()),
            )
        });

        Some(Selector {
            text: text.trim().to_string(),
            specificity,
            steps,
        })
    }

    /// Check whether the selector matches an element
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match self.steps.len() {
            0 => false,
            n => self.matches_step(tree, node, n - 1),
        }
    }

    fn matches_step(&self, tree: &DomTree, node: NodeId, idx: usize) -> bool {
        let (combinator, compound) = &self.steps[idx];
        if !compound.matches(tree, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        match combinator {
            Combinator::Child => {
                parent_element(tree, node).is_some_and(|p| self.matches_step(tree, p, idx - 1))
            }
            Combinator::Descendant => {
                let mut current = parent_element(tree, node);
                while let Some(ancestor) = current {
                    if self.matches_step(tree, ancestor, idx - 1) {
                        return true;
                    }
                    current = parent_element(tree, ancestor);
                }
                false
            }
            Combinator::NextSibling => previous_element(tree, node)
                .is_some_and(|s| self.matches_step(tree, s, idx - 1)),
            Combinator::SubsequentSibling => {
                let mut current = previous_element(tree, node);
                while let Some(sibling) = current {
                    if self.matches_step(tree, sibling, idx - 1) {
                        return true;
                    }
                    current = previous_element(tree, sibling);
                }
                false
            }
        }
    }
}

impl Compound {
    /// Check whether an element matches every simple selector
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(tag) = tree.tag_name(node) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != tag) {
            return false;
        }
        if self.ids.iter().any(|id| tree.attr(node, "id") != Some(id.as_str())) {
            return false;
        }
        if !self.classes.is_empty() {
            let classes = tree.attr(node, "class").unwrap_or("");
            if !self
                .classes
                .iter()
                .all(|c| classes.split_whitespace().any(|have| have == c))
            {
                return false;
            }
        }
        self.attrs.iter().all(|a| a.matches(tree, node))
            && self.pseudo.iter().all(|p| p.matches(tree, node))
    }
}

impl AttrSelector {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(actual) = tree.attr(node, &self.name) else {
            return false;
        };
        let expected = self.value.as_str();
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == expected,
            AttrOp::Includes => actual.split_whitespace().any(|w| w == expected),
            AttrOp::DashMatch => {
                actual == expected || actual.starts_with(&format!("{}-", expected))
            }
            AttrOp::StartsWith => !expected.is_empty() && actual.starts_with(expected),
            AttrOp::EndsWith => !expected.is_empty() && actual.ends_with(expected),
            AttrOp::Contains => !expected.is_empty() && actual.contains(expected),
        }
    }
}

impl PseudoClass {
    fn parse(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "first-child" => Self::FirstChild,
            "last-child" => Self::LastChild,
            "only-child" => Self::OnlyChild,
            "empty" => Self::Empty,
            "root" => Self::Root,
            _ => return None,
        })
    }

    fn matches(self, tree: &DomTree, node: NodeId) -> bool {
        match self {
            Self::FirstChild => previous_element(tree, node).is_none(),
            Self::LastChild => next_element(tree, node).is_none(),
            Self::OnlyChild => {
                previous_element(tree, node).is_none() && next_element(tree, node).is_none()
            }
            Self::Empty => tree
                .children(node)
                .all(|(_, n)| !n.is_element() && !n.is_text()),
            Self::Root => tree
                .parent(node)
                .and_then(|p| tree.get(p))
                .is_some_and(|p| matches!(p.data, NodeData::Document(_))),
        }
    }
}

fn parent_element(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.parent(node).filter(|&p| tree.is_element(p))
}

fn previous_element(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    let mut current = tree.get(node)?.prev_sibling;
    while current.is_valid() {
        if tree.is_element(current) {
            return Some(current);
        }
        current = tree.get(current)?.prev_sibling;
    }
    None
}

fn next_element(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    let mut current = tree.get(node)?.next_sibling;
    while current.is_valid() {
        if tree.is_element(current) {
            return Some(current);
        }
        current = tree.get(current)?.next_sibling;
    }
    None
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

fn parse_compound(chars: &mut Chars<'_>) -> Option<Compound> {
    let mut compound = Compound::default();

    if chars.peek() == Some(&'*') {
        chars.next();
    } else if chars.peek().is_some_and(|&c| is_ident_char(c)) {
        compound.tag = Some(parse_ident(chars)?.to_ascii_lowercase());
    }

    while let Some(&c) = chars.peek() {
        match c {
            '#' => {
                chars.next();
                compound.ids.push(parse_ident(chars)?);
            }
            '.' => {
                chars.next();
                compound.classes.push(parse_ident(chars)?);
            }
            '[' => {
                chars.next();
                compound.attrs.push(parse_attr(chars)?);
            }
            ':' => {
                chars.next();
                // Pseudo-elements never match an element node
                if chars.peek() == Some(&':') {
                    return None;
                }
                compound.pseudo.push(PseudoClass::parse(&parse_ident(chars)?)?);
            }
            c if c.is_whitespace() || matches!(c, '>' | '+' | '~') => break,
            _ => return None,
        }
    }

    Some(compound)
}

fn parse_attr(chars: &mut Chars<'_>) -> Option<AttrSelector> {
    skip_whitespace(chars);
    let name = parse_ident(chars)?.to_ascii_lowercase();
    skip_whitespace(chars);

    let op = match chars.next()? {
        ']' => {
            return Some(AttrSelector {
                name,
                op: AttrOp::Exists,
                value: String::new(),
            });
        }
        '=' => AttrOp::Equals,
        c => {
            if chars.next()? != '=' {
                return None;
            }
            match c {
                '~' => AttrOp::Includes,
                '|' => AttrOp::DashMatch,
                '^' => AttrOp::StartsWith,
                '$' => AttrOp::EndsWith,
                '*' => AttrOp::Contains,
                _ => return None,
            }
        }
    };

    skip_whitespace(chars);
    let value = match chars.peek().copied()? {
        q @ ('"' | '\'') => {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next()? {
                    '\\' => value.push(chars.next()?),
                    c if c == q => break,
                    c => value.push(c),
                }
            }
            value
        }
        _ => parse_ident(chars)?,
    };

    skip_whitespace(chars);
    // Case-sensitivity flags (`i`, `s`) are not supported
    if chars.next()? != ']' {
        return None;
    }

    Some(AttrSelector { name, op, value })
}

fn parse_ident(chars: &mut Chars<'_>) -> Option<String> {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if c == '\\' {
            chars.next();
            ident.push(chars.next()?);
        } else if is_ident_char(c) {
            ident.push(c);
            chars.next();
        } else {
            break;
        }
    }
    (!ident.is_empty()).then_some(ident)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn skip_whitespace(chars: &mut Chars<'_>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

/// Split on `sep` outside brackets, parentheses and quotes
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth -= 1,
            (None, c) if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
