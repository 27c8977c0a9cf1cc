// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! TOML config loader.

use crate::error::{Result, SyntaxError};
use crate::store::Node;

use super::{Format, FormatLoader, LoadContext};

/// Loads TOML documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlLoader;

impl TomlLoader {
    /// Parse TOML text into a tree.
    pub fn parse_str(content: &str) -> Result<Node> {
        let raw: toml::Value = toml::from_str(content).map_err(SyntaxError::from)?;
        Ok(Node::from(raw))
    }
}

impl FormatLoader for TomlLoader {
    fn format(&self) -> Format {
        Format::Toml
    }

    fn load(&self, ctx: &LoadContext<'_>) -> Result<Node> {
        let content = ctx.read_non_empty()?;
        tracing::debug!("Parsing TOML source: {:?}", ctx.source);
        Self::parse_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tables() {
        let toml = r#"
[server]
host = "localhost"
port = 8080
tags = ["a", "b"]
"#;
        let node = TomlLoader::parse_str(toml).unwrap();
        let server = node.as_mapping().unwrap().get("server").unwrap();
        assert_eq!(server.as_mapping().unwrap().get("port"), Some(&Node::Integer(8080)));
        assert_eq!(server.as_mapping().unwrap().get("tags").unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(TomlLoader::parse_str("[server\nhost = 1").is_err());
    }
}
