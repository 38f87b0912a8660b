//! Fully-qualified tree paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step in a path from the tree root to a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{k}"),
            PathSegment::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// A fully-qualified path from the tree root to a particular leaf.
///
/// `Display` renders the dotted/bracketed form used as AEAD associated data
/// and in audit logs (`a.b[2].c`). Index segments never get a leading dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Path(pub Vec<PathSegment>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn push_key(&self, key: impl Into<String>) -> Self {
        let mut segs = self.0.clone();
        segs.push(PathSegment::Key(key.into()));
        Path(segs)
    }

    pub fn push_index(&self, index: usize) -> Self {
        let mut segs = self.0.clone();
        segs.push(PathSegment::Index(index));
        Path(segs)
    }

    /// The associated-data bytes bound to this path by the leaf cipher.
    pub fn as_associated_data(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                PathSegment::Key(_) if i > 0 => write!(f, ".{seg}")?,
                PathSegment::Key(_) => write!(f, "{seg}")?,
                PathSegment::Index(_) => write!(f, "{seg}")?,
            }
        }
        Ok(())
    }
}
