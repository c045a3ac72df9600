//! Frame access
//!
//! Explicit capability check for reaching into an embedded document.
//! "No document" and "access denied" stay distinct so callers can tell
//! an empty frame from a cross-origin one.

use crate::{DomTree, NodeId};

/// Why a frame's document could not be reached
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameAccessError {
    #[error("node {0:?} is not a frame element")]
    NotAFrame(NodeId),

    #[error("frame {0:?} has no document")]
    NoDocument(NodeId),

    #[error("frame {frame:?} is cross-origin ({origin})")]
    CrossOrigin { frame: NodeId, origin: String },
}

impl FrameAccessError {
    /// Whether access was refused by the origin policy
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::CrossOrigin { .. })
    }
}

impl DomTree {
    /// Reach the document loaded into an `iframe`.
    ///
    /// Succeeds only when the frame document shares an origin with the
    /// document containing the frame element.
    pub fn try_access_frame(&self, frame: NodeId) -> Result<NodeId, FrameAccessError> {
        if !self.is_frame(frame) {
            return Err(FrameAccessError::NotAFrame(frame));
        }

        let document = self
            .get(frame)
            .and_then(|n| n.as_element())
            .and_then(|e| e.content_document)
            .ok_or(FrameAccessError::NoDocument(frame))?;

        // A detached frame has no browsing context
        let owner = self
            .containing_document(frame)
            .ok_or(FrameAccessError::NoDocument(frame))?;

        let frame_origin = self
            .get(document)
            .and_then(|n| n.as_document())
            .map(|d| &d.origin)
            .ok_or(FrameAccessError::NoDocument(frame))?;
        let owner_origin = self
            .get(owner)
            .and_then(|n| n.as_document())
            .map(|d| &d.origin)
            .ok_or(FrameAccessError::NoDocument(frame))?;

        if frame_origin != owner_origin {
            tracing::trace!(?frame, "frame access denied by origin policy");
            return Err(FrameAccessError::CrossOrigin {
                frame,
                origin: frame_origin.ascii_serialization(),
            });
        }

        Ok(document)
    }
}
