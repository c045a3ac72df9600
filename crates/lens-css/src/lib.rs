//! Lens CSS Parser & Style System
//!
//! Parses style sheets and inline styles with lightningcss and computes
//! the rendering properties that decide whether an element is visible:
//! `display`, `visibility` and `opacity`.

mod cascade;
mod computed;
mod parser;
mod properties;
mod selectors;

pub use cascade::StyleResolver;
pub use computed::ComputedStyle;
pub use parser::CssParser;
pub use properties::{Display, PropertyId, PropertyValue, Visibility};
pub use selectors::{AttrOp, Combinator, Compound, Selector};

use lens_dom::NodeId;

/// Parse a CSS stylesheet
pub fn parse_stylesheet(css: &str) -> Result<Stylesheet, CssError> {
    CssParser::new().parse(css)
}

/// Parsed stylesheet
#[derive(Debug, Default)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// CSS rule
#[derive(Debug)]
pub struct Rule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// Selector specificity (a, b, c)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity(pub u32, pub u32, pub u32);

/// CSS declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub value: PropertyValue,
    pub important: bool,
}

/// CSS parsing error
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: u32, message: String },
}

/// Style computation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    #[error("node {0:?} does not exist")]
    InvalidNode(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {0:?} is not connected to a document")]
    Detached(NodeId),
}
