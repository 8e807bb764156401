//! Path grammar for addressing nodes in the inspected tree
//!
//! Paths are flat, dotted strings: the root is `$`, a field access appends
//! `.name` and an index access appends `.0`. Bracket syntax is not parsed, so
//! `$[0]` is a single field segment named `[0]`.
#![allow(clippy::must_use_candidate)]

use std::fmt;

/// Literal denoting the tree root
pub const ROOT: &str = "$";

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Named field access
    Field(String),

    /// Sequence index access
    Index(usize),
}

impl Segment {
    /// Classify a raw segment: all-decimal-digit text is an index, anything else a field.
    /// Digit strings that overflow `usize` saturate to `usize::MAX`.
    pub fn classify(raw: &str) -> Self {
        if is_index_segment(raw) {
            Segment::Index(raw.parse().unwrap_or(usize::MAX))
        } else {
            Segment::Field(raw.to_string())
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, "{name}"),
            Segment::Index(idx) => write!(f, "{idx}"),
        }
    }
}

/// Strict index test: non-empty and every character an ASCII decimal digit
pub fn is_index_segment(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Split a path into its raw segments without classifying them.
///
/// `$` yields no segments. Otherwise a leading `$.` is stripped (or, if the
/// path does not start that way, its first character) and the rest is split
/// on `.`.
pub fn split_path(path: &str) -> Vec<&str> {
    if path == ROOT {
        return Vec::new();
    }
    let rest = match path.strip_prefix("$.") {
        Some(rest) => rest,
        None => path.char_indices().nth(1).map_or("", |(idx, _)| &path[idx..]),
    };
    rest.split('.').collect()
}

/// Parse a path into classified segments
pub fn parse_segments(path: &str) -> Vec<Segment> {
    split_path(path).into_iter().map(Segment::classify).collect()
}

/// A location in the inspected tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    segments: Vec<Segment>,
}

impl ObjectPath {
    /// The root path `$`
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path string
    pub fn parse(path: &str) -> Self {
        Self {
            segments: parse_segments(path),
        }
    }

    /// Path of a named child
    pub fn field(&self, name: impl Into<String>) -> Self {
        self.child(Segment::Field(name.into()))
    }

    /// Path of an indexed child
    pub fn index(&self, idx: usize) -> Self {
        self.child(Segment::Index(idx))
    }

    /// Path extended by one segment
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Last segment, i.e. the node's key within its parent
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ROOT}")?;
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}
