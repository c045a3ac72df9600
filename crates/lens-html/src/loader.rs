//! Frame document sources

use std::collections::HashMap;
use url::Url;

/// Supplies markup for `<iframe src>` documents.
///
/// Returning `None` leaves the frame without a document.
pub trait FrameLoader {
    fn load(&self, url: &Url) -> Option<String>;
}

/// In-memory frame sources keyed by absolute URL
#[derive(Debug, Clone, Default)]
pub struct StaticFrames {
    pages: HashMap<String, String>,
}

impl StaticFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register markup for a URL
    pub fn insert(&mut self, url: &str, html: impl Into<String>) -> &mut Self {
        let key = Url::parse(url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());
        self.pages.insert(key, html.into());
        self
    }
}

impl FrameLoader for StaticFrames {
    fn load(&self, url: &Url) -> Option<String> {
        self.pages.get(url.as_str()).cloned()
    }
}
