// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! YAML config loader.

use crate::error::{ConfigError, Result, SyntaxError};
use crate::store::Node;

use super::{Format, FormatLoader, LoadContext};

/// Loads YAML documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlLoader;

impl YamlLoader {
    /// Parse YAML text into a tree.
    pub fn parse_str(content: &str) -> Result<Node> {
        let raw: serde_yaml::Value = serde_yaml::from_str(content).map_err(SyntaxError::from)?;
        Ok(Node::from(raw))
    }
}

impl FormatLoader for YamlLoader {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn load(&self, ctx: &LoadContext<'_>) -> Result<Node> {
        let content = ctx.read_non_empty()?;
        tracing::debug!("Parsing YAML source: {:?}", ctx.source);
        match Self::parse_str(&content)? {
            // comments or a bare `---` only
            Node::Null => Err(ConfigError::EmptyConfigSource {
                path: ctx.source_path()?.to_path_buf(),
            }
            .into()),
            node => Ok(node),
        }
    }
}
