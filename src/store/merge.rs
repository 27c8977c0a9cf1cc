// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Recursive merge of config trees.
//!
//! Mappings merge key by key, sequences concatenate, and any other pairing
//! is overwritten by the right-hand side. Merging never fails.

use super::node::{Mapping, Node};

impl Node {
    /// Merge `right` into this node.
    pub fn merge_in_place(&mut self, right: Node) {
        match (self, right) {
            (Node::Mapping(left), Node::Mapping(right)) => merge_mappings(left, right),
            (Node::Sequence(left), Node::Sequence(right)) => left.extend(right),
            (slot, right) => *slot = right,
        }
    }
}

/// Merge two nodes, returning the combined tree.
pub fn merge_nodes(mut left: Node, right: Node) -> Node {
    left.merge_in_place(right);
    left
}

/// Merge every entry of `right` into `left`. New keys are appended in the
/// order they appear in `right`.
pub fn merge_mappings(left: &mut Mapping, right: Mapping) {
    for (key, value) in right {
        match left.get_mut(&key) {
            Some(existing) => existing.merge_in_place(value),
            None => {
                left.insert(key, value);
            }
        }
    }
}
