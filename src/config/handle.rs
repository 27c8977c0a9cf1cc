// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! The caller-facing settings object.

use crate::error::{ConfigError, PathError, Result};
use crate::loaders::Format;
use crate::store::{Mapping, Node, Number, Store};
use std::fmt;

/// Raw input accepted by [`ConfigHandle::create`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawSource {
    /// An already parsed tree.
    Tree(Node),
    /// A JSON document.
    Json(String),
}

impl From<Node> for RawSource {
    fn from(node: Node) -> Self {
        RawSource::Tree(node)
    }
}

impl From<Mapping> for RawSource {
    fn from(mapping: Mapping) -> Self {
        RawSource::Tree(Node::Mapping(mapping))
    }
}

impl From<&str> for RawSource {
    fn from(json: &str) -> Self {
        RawSource::Json(json.to_string())
    }
}

impl From<String> for RawSource {
    fn from(json: String) -> Self {
        RawSource::Json(json)
    }
}

/// An immutable config tree plus where it came from.
///
/// Handles never change after construction. Operations that would modify
/// the tree ([`import_config`](Self::import_config),
/// [`with_value`](Self::with_value)) return a new handle instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigHandle {
    store: Store,
    source_ref: String,
    format: Format,
}

impl ConfigHandle {
    /// Build a handle from a parsed tree or a JSON string.
    ///
    /// The root must be map-shaped: sequences are re-keyed by index,
    /// scalars and nulls are rejected.
    pub fn create(
        source: impl Into<RawSource>,
        source_ref: impl Into<String>,
        format: Format,
    ) -> Result<Self> {
        let source_ref = source_ref.into();
        let tree = match source.into() {
            RawSource::Tree(node) => node,
            RawSource::Json(json) => serde_json::from_str::<serde_json::Value>(&json)
                .map(Node::from)
                .map_err(|e| ConfigError::UnknownConfigSourceStructure {
                    source_ref: source_ref.clone(),
                    format,
                    message: format!("not a JSON document: {}", e),
                })?,
        };
        let mapping = root_mapping(tree).map_err(|kind| ConfigError::UnknownConfigSourceStructure {
            source_ref: source_ref.clone(),
            format,
            message: format!("expected a mapping at the root, found {}", kind),
        })?;

        Ok(Self {
            store: Store::from_mapping(mapping),
            source_ref,
            format,
        })
    }

    pub fn source_ref(&self) -> &str {
        &self.source_ref
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn path_separator(&self) -> &str {
        self.store.path_separator()
    }

    /// Return this handle using `separator` for path lookups.
    pub fn with_path_separator(mut self, separator: &str) -> Self {
        self.store.set_path_separator(separator);
        self
    }

    pub fn has(&self, path: &str) -> bool {
        self.store.has(path)
    }

    /// Borrow the value at `path`.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        self.store.lookup(path)
    }

    /// The value at `path`, or `default` when it does not resolve.
    pub fn get(&self, path: &str, default: impl Into<Node>) -> Node {
        self.store.get(path, default.into())
    }

    /// Like [`get`](Self::get), but a mapping resolves to the sequence of
    /// its keys.
    pub fn get_keys_at(&self, path: &str, default: impl Into<Node>) -> Node {
        match self.store.lookup(path) {
            Some(Node::Mapping(map)) => {
                Node::Sequence(map.keys().map(|k| Node::String(k.clone())).collect())
            }
            Some(node) => node.clone(),
            None => default.into(),
        }
    }

    /// Resolve `name` (below `path`, when given) as a number.
    ///
    /// Absent values read as `0`; present non-numeric values are a
    /// [`ConfigError::TypeMismatch`].
    pub fn get_numeric(&self, name: &str, path: Option<&str>) -> Result<Number> {
        let full = match path {
            Some(parent) => self.store.join_path(parent, name),
            None => name.to_string(),
        };
        match self.store.lookup(&full) {
            None => Ok(Number::Integer(0)),
            Some(node) => node.as_number().ok_or_else(|| {
                ConfigError::TypeMismatch {
                    path: full.clone(),
                    found: node.kind().to_string(),
                }
                .into()
            }),
        }
    }

    /// Top-level keys in order.
    pub fn get_keys(&self) -> Vec<String> {
        self.store.keys()
    }

    /// An independent handle over a copy of the container at `path`.
    pub fn get_sub_section(&self, path: &str) -> Result<ConfigHandle> {
        let node = self.store.lookup(path).ok_or_else(|| PathError::NotFound {
            path: path.to_string(),
        })?;
        let mapping = root_mapping(node.clone()).map_err(|kind| {
            ConfigError::UnknownConfigSourceStructure {
                source_ref: self.source_ref.clone(),
                format: self.format,
                message: format!("'{}' is a {}, not a section", path, kind),
            }
        })?;
        let mut store = Store::from_mapping(mapping);
        store.set_path_separator(self.store.path_separator());
        Ok(Self {
            store,
            source_ref: self.source_ref.clone(),
            format: self.format,
        })
    }

    /// A new handle holding this tree deep-merged with `other`'s.
    ///
    /// Mappings merge key by key, sequences concatenate, anything else is
    /// replaced by `other`'s value.
    pub fn import_config(&self, other: &ConfigHandle) -> ConfigHandle {
        let mut merged = self.clone();
        merged.store.merge(other.to_mapping());
        merged
    }

    /// A new handle with `value` stored at `path`.
    pub fn with_value(&self, path: &str, value: impl Into<Node>) -> Result<ConfigHandle> {
        let mut updated = self.clone();
        updated.store.set(path, value)?;
        Ok(updated)
    }

    /// A plain copy of the tree.
    pub fn to_mapping(&self) -> Mapping {
        self.store.mapping().clone()
    }

    pub fn as_mapping(&self) -> &Mapping {
        self.store.mapping()
    }

    pub fn to_json_string(&self, pretty: bool) -> String {
        self.store.to_json_string(pretty)
    }
}

impl fmt::Display for ConfigHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.store.to_json_string(true))
    }
}

/// Turn a node into a root mapping, or report its kind.
fn root_mapping(node: Node) -> std::result::Result<Mapping, &'static str> {
    match node {
        Node::Mapping(map) => Ok(map),
        Node::Sequence(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(i, item)| (i.to_string(), item))
            .collect()),
        other => Err(other.kind()),
    }
}
