// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Path-addressable settings store.
//!
//! A [`Store`] owns a tree whose root is always a mapping and resolves
//! delimited string paths (`"a.b.0.c"`) against it. Read access never fails:
//! unresolvable paths degrade to `None`, `false` or a caller default.
//! Mutable access reports why a path could not be reached.

mod merge;
mod node;
mod path;

pub use merge::{merge_mappings, merge_nodes};
pub use node::{cast_scalar, Mapping, Node, Number};
pub use path::{sequence_index, ConfigPath};

use crate::error::PathError;

/// Default path segment separator.
pub const DEFAULT_PATH_SEPARATOR: &str = ".";

/// A config tree with path-based access.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    root: Node,
    separator: String,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::from_mapping(Mapping::new())
    }

    /// Create a store over an existing mapping.
    pub fn from_mapping(mapping: Mapping) -> Self {
        Self {
            root: Node::Mapping(mapping),
            separator: DEFAULT_PATH_SEPARATOR.to_string(),
        }
    }

    /// The root node (always a mapping).
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The root mapping.
    pub fn mapping(&self) -> &Mapping {
        match &self.root {
            Node::Mapping(map) => map,
            _ => unreachable!("store root is always a mapping"),
        }
    }

    fn mapping_mut(&mut self) -> &mut Mapping {
        self.root.make_mapping()
    }

    /// Consume the store, returning the root mapping.
    pub fn into_mapping(self) -> Mapping {
        match self.root {
            Node::Mapping(map) => map,
            _ => Mapping::new(),
        }
    }

    /// The current path separator.
    pub fn path_separator(&self) -> &str {
        &self.separator
    }

    /// Change the path separator. An empty separator resets to the default.
    pub fn set_path_separator(&mut self, separator: &str) {
        self.separator = if separator.is_empty() {
            DEFAULT_PATH_SEPARATOR.to_string()
        } else {
            separator.to_string()
        };
    }

    /// Split a path string using this store's separator.
    pub fn split_path(&self, path: &str) -> ConfigPath {
        ConfigPath::parse(path, &self.separator)
    }

    /// Join segments into a path string using this store's separator.
    pub fn join_path(&self, parent: &str, name: &str) -> String {
        if parent.is_empty() {
            name.to_string()
        } else {
            format!("{}{}{}", parent, self.separator, name)
        }
    }

    /// Check whether `path` resolves to a value.
    pub fn has(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Resolve `path` to a borrowed node.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        let parsed = self.split_path(path);
        parsed
            .segments()
            .iter()
            .try_fold(&self.root, |node, segment| path::child(node, segment))
    }

    /// Resolve `path` to an owned copy of its value, or return `default`
    /// unchanged when it does not resolve.
    pub fn get(&self, path: &str, default: Node) -> Node {
        self.lookup(path).cloned().unwrap_or(default)
    }

    /// Mutable access to an existing value.
    pub fn get_mut(&mut self, path: &str) -> Result<&mut Node, PathError> {
        self.get_reference(path, false)
    }

    /// Mutable access to a value, creating intermediate mappings (and an
    /// empty mapping at the final segment) where keys are absent.
    pub fn entry_mut(&mut self, path: &str) -> Result<&mut Node, PathError> {
        self.get_reference(path, true)
    }

    /// Resolve `path` to a mutable reference into the tree.
    ///
    /// With `create`, absent mapping keys are filled with empty mappings.
    /// Sequences are never grown and scalars are never replaced.
    pub fn get_reference(&mut self, path: &str, create: bool) -> Result<&mut Node, PathError> {
        let parsed = self.split_path(path);
        if parsed.is_root() {
            return Err(PathError::EmptyPath);
        }
        walk_mut(&mut self.root, &parsed, parsed.segments().len(), create)
    }

    /// Store `value` at `path`, creating intermediate mappings.
    pub fn set(&mut self, path: &str, value: impl Into<Node>) -> Result<(), PathError> {
        let slot = self.entry_mut(path)?;
        *slot = value.into();
        Ok(())
    }

    /// Remove and return the value at `path`.
    pub fn remove(&mut self, path: &str) -> Option<Node> {
        let parsed = self.split_path(path);
        let last = parsed.last()?.to_string();
        let depth = parsed.segments().len() - 1;
        let parent = walk_mut(&mut self.root, &parsed, depth, false).ok()?;
        match parent {
            Node::Mapping(map) => map.shift_remove(&last),
            Node::Sequence(items) => {
                let index = sequence_index(&last)?;
                (index < items.len()).then(|| items.remove(index))
            }
            _ => None,
        }
    }

    /// Deep-merge a mapping into the root.
    pub fn merge(&mut self, other: Mapping) {
        merge_mappings(self.mapping_mut(), other);
    }

    /// Deep-merge `node` into the value at `path`, creating the path first.
    pub fn merge_at(&mut self, path: &str, node: Node) -> Result<(), PathError> {
        if path.is_empty() {
            if let Node::Mapping(map) = node {
                self.merge(map);
                return Ok(());
            }
            return Err(PathError::EmptyPath);
        }
        let slot = self.entry_mut(path)?;
        slot.merge_in_place(node);
        Ok(())
    }

    /// Top-level keys in order.
    pub fn keys(&self) -> Vec<String> {
        self.mapping().keys().cloned().collect()
    }

    /// Render the tree as JSON.
    pub fn to_json_string(&self, pretty: bool) -> String {
        let value = self.root.to_json();
        let rendered = if pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        rendered.unwrap_or_default()
    }
}

/// Walk the first `depth` segments of `path` below `node`.
fn walk_mut<'a>(
    node: &'a mut Node,
    path: &ConfigPath,
    depth: usize,
    create: bool,
) -> Result<&'a mut Node, PathError> {
    let mut current = node;
    for (index, segment) in path.segments()[..depth].iter().enumerate() {
        current = match current {
            Node::Mapping(map) => {
                if create {
                    map.entry(segment.clone()).or_insert_with(Node::empty_mapping)
                } else {
                    map.get_mut(segment).ok_or_else(|| PathError::NotFound {
                        path: path.prefix(index + 1),
                    })?
                }
            }
            Node::Sequence(items) => {
                let len = items.len();
                match sequence_index(segment) {
                    Some(i) if i < len => &mut items[i],
                    Some(_) => {
                        return Err(PathError::IndexOutOfRange {
                            path: path.prefix(index),
                            segment: segment.clone(),
                        })
                    }
                    None => {
                        return Err(PathError::NotFound {
                            path: path.prefix(index + 1),
                        })
                    }
                }
            }
            _ => {
                return Err(PathError::NotAContainer {
                    path: path.prefix(index),
                })
            }
        };
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Store {
        let json = r#"{
            "yml": {"string": "Evil_Wizard", "array": [1, 2, 3]},
            "servers": [{"host": "a"}, {"host": "b"}],
            "flag": true
        }"#;
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        match Node::from(value) {
            Node::Mapping(map) => Store::from_mapping(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_get_and_has() {
        let store = sample();
        assert!(store.has("yml.string"));
        assert_eq!(store.get("yml.string", Node::Null), Node::from("Evil_Wizard"));
        assert_eq!(store.get("yml.array", Node::Null).len(), 3);
        assert_eq!(store.get("servers.1.host", Node::Null), Node::from("b"));
    }

    #[test]
    fn test_missing_path_returns_default_unchanged() {
        let store = sample();
        let default = Node::from("fallback");
        assert!(!store.has("yml.missing"));
        assert_eq!(store.get("yml.missing", default.clone()), default);
        // descending through a scalar fails
        assert!(!store.has("flag.deeper"));
        assert!(!store.has("servers.9"));
        assert!(!store.has("servers.first"));
    }

    #[test]
    fn test_empty_path_is_root() {
        let store = sample();
        assert!(store.has(""));
        assert_eq!(store.lookup("").unwrap().keys().unwrap(), store.keys());
    }

    #[test]
    fn test_get_reference_errors() {
        let mut store = sample();
        assert_eq!(
            store.get_mut("yml.nope"),
            Err(PathError::NotFound {
                path: "yml.nope".to_string()
            })
        );
        assert_eq!(
            store.get_mut("flag.x"),
            Err(PathError::NotAContainer {
                path: "flag".to_string()
            })
        );
        assert!(matches!(
            store.get_mut("servers.5.host"),
            Err(PathError::IndexOutOfRange { .. })
        ));
        assert_eq!(store.get_mut(""), Err(PathError::EmptyPath));
    }

    #[test]
    fn test_get_reference_mutates_in_place() {
        let mut store = sample();
        *store.get_mut("servers.0.host").unwrap() = Node::from("z");
        assert_eq!(store.get("servers.0.host", Node::Null), Node::from("z"));
    }

    #[test]
    fn test_set_creates_intermediate_mappings() {
        let mut store = Store::new();
        store.set("a.b.c", 5).unwrap();
        assert_eq!(store.get("a.b.c", Node::Null), Node::Integer(5));
        assert!(store.lookup("a.b").unwrap().is_mapping());
    }

    #[test]
    fn test_remove() {
        let mut store = sample();
        assert_eq!(store.remove("yml.string"), Some(Node::from("Evil_Wizard")));
        assert!(!store.has("yml.string"));
        assert_eq!(store.remove("yml.array.0"), Some(Node::Integer(1)));
        assert_eq!(store.get("yml.array", Node::Null).len(), 2);
        assert_eq!(store.remove("nothing.here"), None);
    }

    #[test]
    fn test_path_separator_override() {
        let mut store = Store::new();
        store.set_path_separator("/");
        store.set("db/slaves/10.0.0.1", "primary").unwrap();
        assert_eq!(store.path_separator(), "/");
        assert_eq!(store.get("db/slaves/10.0.0.1", Node::Null), Node::from("primary"));
        store.set_path_separator("");
        assert_eq!(store.path_separator(), DEFAULT_PATH_SEPARATOR);
    }

    #[test]
    fn test_merge_at() {
        let mut store = sample();
        let extra: Mapping = [("extra".to_string(), Node::Bool(true))].into_iter().collect();
        store.merge_at("yml", Node::Mapping(extra)).unwrap();
        assert_eq!(store.get("yml.extra", Node::Null), Node::Bool(true));
        assert_eq!(store.get("yml.string", Node::Null), Node::from("Evil_Wizard"));
    }

    #[test]
    fn test_to_json_string() {
        let mut store = Store::new();
        store.set("a", 1).unwrap();
        assert_eq!(store.to_json_string(false), r#"{"a":1}"#);
    }
}
