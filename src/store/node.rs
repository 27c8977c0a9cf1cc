// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! The polymorphic value stored in a config tree.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Ordered, string-keyed collection of nodes.
pub type Mapping = IndexMap<String, Node>;

/// A value in a config tree.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Node {
    /// An explicit null (`~`, `null`).
    #[default]
    Null,
    /// A boolean scalar.
    Bool(bool),
    /// An integer scalar.
    Integer(i64),
    /// A floating-point scalar.
    Float(f64),
    /// A string scalar.
    String(String),
    /// An ordered, index-addressed list.
    Sequence(Vec<Node>),
    /// An ordered, key-addressed map.
    Mapping(Mapping),
}

/// A numeric config value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// The value as a float.
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// The value as an integer, truncating floats.
    pub fn as_i64(self) -> i64 {
        match self {
            Number::Integer(i) => i,
            Number::Float(f) => f as i64,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

impl Node {
    /// Create an empty mapping node.
    pub fn empty_mapping() -> Self {
        Node::Mapping(Mapping::new())
    }

    /// Short name of the node kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Integer(_) => "integer",
            Node::Float(_) => "float",
            Node::String(_) => "string",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
        }
    }

    /// Whether this node is a sequence or a mapping.
    pub fn is_container(&self) -> bool {
        matches!(self, Node::Sequence(_) | Node::Mapping(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Integer(i) => Some(*i as f64),
            Node::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Interpret the node as a number.
    ///
    /// Numeric strings count as numbers, booleans and containers do not.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Node::Integer(i) => Some(Number::Integer(*i)),
            Node::Float(f) => Some(Number::Float(*f)),
            Node::String(s) => match cast_scalar(s.trim()) {
                Node::Integer(i) => Some(Number::Integer(i)),
                Node::Float(f) => Some(Number::Float(f)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Number of direct children, zero for scalars.
    pub fn len(&self) -> usize {
        match self {
            Node::Sequence(items) => items.len(),
            Node::Mapping(map) => map.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of a mapping in order, `None` for other kinds.
    pub fn keys(&self) -> Option<Vec<String>> {
        self.as_mapping().map(|map| map.keys().cloned().collect())
    }

    /// Borrow this node as a mapping, replacing it with an empty mapping
    /// first if it holds anything else.
    pub fn make_mapping(&mut self) -> &mut Mapping {
        if !self.is_mapping() {
            *self = Node::empty_mapping();
        }
        match self {
            Node::Mapping(map) => map,
            _ => unreachable!("node was just replaced with a mapping"),
        }
    }

    /// Convert to a `serde_json::Value`, preserving key order.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Cast a raw string into the most specific scalar it spells.
///
/// `true`/`false` (any case) become booleans, integer and decimal literals
/// become numbers, anything else stays a string.
pub fn cast_scalar(raw: &str) -> Node {
    if raw.eq_ignore_ascii_case("true") {
        return Node::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Node::Bool(false);
    }
    if looks_numeric(raw) {
        if let Ok(i) = raw.parse::<i64>() {
            return Node::Integer(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return Node::Float(f);
        }
    }
    Node::String(raw.to_string())
}

// Rust's float parser also accepts "inf" and "NaN", which must stay strings.
fn looks_numeric(raw: &str) -> bool {
    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    !digits.is_empty()
        && digits.bytes().any(|b| b.is_ascii_digit())
        && digits
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'-' | b'+'))
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Null => write!(f, "null"),
            Node::Bool(b) => write!(f, "{}", b),
            Node::Integer(i) => write!(f, "{}", i),
            Node::Float(x) => write!(f, "{}", x),
            Node::String(s) => write!(f, "{}", s),
            container => write!(f, "{}", container.to_json()),
        }
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Integer(value)
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Node::Integer(i64::from(value))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Float(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::Sequence(value)
    }
}

impl From<Mapping> for Node {
    fn from(value: Mapping) -> Self {
        Node::Mapping(value)
    }
}

impl From<Number> for Node {
    fn from(value: Number) -> Self {
        match value {
            Number::Integer(i) => Node::Integer(i),
            Number::Float(f) => Node::Float(f),
        }
    }
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Node::Integer(i),
                None => Node::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Node::String(s),
            Value::Array(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => Node::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, Node::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_yaml::Value> for Node {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Node::Integer(i),
                None => Node::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Node::String(s),
            Value::Sequence(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Mapping(map) => Node::Mapping(
                map.into_iter()
                    .map(|(key, value)| (yaml_key(key), Node::from(value)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Node::from(tagged.value),
        }
    }
}

/// YAML allows non-string keys; they are addressed by their text.
fn yaml_key(key: serde_yaml::Value) -> String {
    match Node::from(key) {
        Node::String(s) => s,
        Node::Null => String::new(),
        other => other.to_string(),
    }
}

impl From<toml::Value> for Node {
    fn from(value: toml::Value) -> Self {
        use toml::Value;
        match value {
            Value::String(s) => Node::String(s),
            Value::Integer(i) => Node::Integer(i),
            Value::Float(f) => Node::Float(f),
            Value::Boolean(b) => Node::Bool(b),
            Value::Datetime(dt) => Node::String(dt.to_string()),
            Value::Array(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Table(table) => Node::Mapping(
                table
                    .into_iter()
                    .map(|(key, value)| (key, Node::from(value)))
                    .collect(),
            ),
        }
    }
}
