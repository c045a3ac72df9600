//! Lens DOM - Document Object Model
//!
//! Arena-based DOM forest. The main document, its shadow roots and the
//! documents of embedded frames all live in one arena, so a [`NodeId`]
//! identifies a node across every boundary.

mod node;
mod tree;
mod document;
mod interner;
mod shadow;
mod frame;

pub use node::{Attribute, DocumentData, ElementData, Node, NodeData};
pub use tree::{origin_of, Children, DomTree};
pub use document::Document;
pub use interner::{InternedString, StringInterner};
pub use shadow::{ShadowRootData, ShadowRootMode};
pub use frame::FrameAccessError;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root document node of a tree
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node" links
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this id points at a node rather than the sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Structural DOM errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    InvalidNode(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {child:?} cannot be inserted under {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("element {0:?} already hosts a shadow root")]
    ShadowRootExists(NodeId),

    #[error("node {0:?} is not a frame element")]
    NotAFrame(NodeId),

    #[error("node {0:?} is not a document")]
    NotADocument(NodeId),
}
