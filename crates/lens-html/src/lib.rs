//! Lens HTML Parser
//!
//! HTML5 parsing built on html5ever. Produces a single DOM forest with
//! declarative shadow roots attached and frame documents loaded.

mod loader;
mod parser;

pub use lens_dom::Document;
pub use loader::{FrameLoader, StaticFrames};
pub use parser::HtmlParser;

/// Parse an HTML string into a document at `about:blank`
pub fn parse(html: &str) -> Result<Document, ParseError> {
    HtmlParser::new().parse(html)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid document structure: {0}")]
    Dom(#[from] lens_dom::DomError),
}
