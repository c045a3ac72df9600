//! Snapshot Configuration

use std::fmt;
use std::str::FromStr;

use crate::SnapshotError;

/// Which simplified tree to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Markers plus the visibility-filtered tree
    #[default]
    RefId,
    /// Per-tag keys and element paths
    Path,
}

impl FromStr for Variant {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ref-id" | "refid" | "ref_id" | "ref" => Ok(Self::RefId),
            "path" | "xpath" => Ok(Self::Path),
            _ => Err(SnapshotError::UnknownVariant(s.to_string())),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RefId => f.write_str("ref-id"),
            Self::Path => f.write_str("path"),
        }
    }
}

/// Snapshot options
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Pipeline to run
    pub variant: Variant,

    /// First marker value of an assignment pass
    pub start_marker: u32,

    /// Indent output JSON by two spaces
    pub pretty: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            variant: Variant::RefId,
            start_marker: 1,
            pretty: true,
        }
    }
}
