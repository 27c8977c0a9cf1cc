// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Delimited string paths into a config tree.

use super::node::Node;

/// A path split into its segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath {
    segments: Vec<String>,
    separator: String,
}

impl ConfigPath {
    /// Split `path` on `separator`. The empty path has no segments and
    /// addresses the root.
    pub fn parse(path: &str, separator: &str) -> Self {
        let segments = if path.is_empty() {
            Vec::new()
        } else {
            path.split(separator).map(str::to_string).collect()
        };
        Self {
            segments,
            separator: separator.to_string(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Render the first `depth` segments back into a path string.
    pub fn prefix(&self, depth: usize) -> String {
        self.segments[..depth.min(self.segments.len())].join(&self.separator)
    }
}

impl std::fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join(&self.separator))
    }
}

/// Parse a segment as a sequence index. Only plain decimal digits qualify.
pub fn sequence_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Resolve one segment below `node`.
///
/// Mapping nodes are keyed by the literal segment; sequence nodes take the
/// segment as an index. Scalars have no children.
pub fn child<'a>(node: &'a Node, segment: &str) -> Option<&'a Node> {
    match node {
        Node::Mapping(map) => map.get(segment),
        Node::Sequence(items) => sequence_index(segment).and_then(|i| items.get(i)),
        _ => None,
    }
}
