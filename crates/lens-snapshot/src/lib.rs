//! Lens Snapshot
//!
//! The DOM simplification and serialization engine. Walks a document
//! forest (main document, shadow roots, same-origin and cross-origin
//! frames) and produces compact JSON an agent can reason about and
//! address elements from.
//!
//! Two pipelines share one boundary-safe visitor:
//! - **ref-id**: stamp every reachable element with a marker, then emit
//!   the visible, meaningful elements annotated with those markers.
//! - **path**: key every element by tag and ordinal and attach its
//!   XPath-like location.
//!
//! # Example
//! ```rust,ignore
//! use lens_snapshot::{Snapshotter, SnapshotConfig};
//!
//! let mut doc = lens_html::parse("<body><button>Go</button></body>")?;
//! let json = Snapshotter::new(SnapshotConfig::default()).snapshot(&mut doc)?;
//! ```

mod assign;
mod config;
mod path_tree;
mod refid;
mod visitor;
mod xpath;

pub use assign::assign_ref_ids;
pub use config::{SnapshotConfig, Variant};
pub use path_tree::{build_path_tree, PathEntry, PathNode, TagCounters, PATH_IGNORED_TAGS};
pub use refid::{
    build_ref_tree, AttrValue, Attributes, Outcome, RefTreeBuilder, SimplifiedNode, ALWAYS_KEEP,
    CROSS_ORIGIN_FLAG, CURATED_ATTRIBUTES, IGNORED_TAGS,
};
pub use visitor::{effective_children, frame_content, FrameContent, Visitor};
pub use xpath::{element_path, resolve_path, BODY_PATH};

use lens_css::StyleResolver;
use lens_dom::{Document, DomTree, NodeId};
use serde::Serialize;

/// Snapshot failure
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to serialize snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown snapshot variant '{0}' (expected 'ref-id' or 'path')")]
    UnknownVariant(String),
}

/// Body of the main document; the default root of every pass
fn main_body(tree: &DomTree) -> Option<NodeId> {
    tree.body(tree.root())
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, SnapshotError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

/// Mark every element from the body, then return the ref-id tree as
/// pretty JSON (`null` when the body is missing or filtered out)
pub fn ref_id_structure(tree: &mut DomTree, styles: &StyleResolver) -> Result<String, SnapshotError> {
    Snapshotter::default().ref_id(tree, styles)
}

/// Path tree of the body as pretty JSON, wrapped as `{ "body": ... }`
pub fn path_structure(tree: &DomTree) -> Result<String, SnapshotError> {
    Snapshotter::default().path(tree)
}

#[derive(Serialize)]
struct PathStructure {
    body: Option<PathEntry>,
}

/// Runs the configured pipeline over documents
#[derive(Debug, Default)]
pub struct Snapshotter {
    config: SnapshotConfig,
}

impl Snapshotter {
    pub fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Run the configured variant; author styles come from the
    /// document's `<style>` elements
    pub fn snapshot(&self, document: &mut Document) -> Result<String, SnapshotError> {
        tracing::debug!(url = document.url(), variant = %self.config.variant, "taking snapshot");
        match self.config.variant {
            Variant::RefId => {
                let styles = StyleResolver::for_tree(document.tree());
                self.ref_id(document.tree_mut(), &styles)
            }
            Variant::Path => self.path(document.tree()),
        }
    }

    /// Assignment pass followed by the ref-id tree
    pub fn ref_id(&self, tree: &mut DomTree, styles: &StyleResolver) -> Result<String, SnapshotError> {
        let simplified = main_body(tree).and_then(|body| {
            assign_ref_ids(tree, body, self.config.start_marker);
            build_ref_tree(tree, styles, body)
        });
        to_json(&simplified, self.config.pretty)
    }

    /// Path tree with fresh counters
    pub fn path(&self, tree: &DomTree) -> Result<String, SnapshotError> {
        let body = main_body(tree)
            .and_then(|body| build_path_tree(tree, body, &mut TagCounters::new()));
        to_json(&PathStructure { body }, self.config.pretty)
    }
}
