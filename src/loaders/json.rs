// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! JSON config loader.

use crate::error::{Result, SyntaxError};
use crate::store::Node;

use super::{Format, FormatLoader, LoadContext};

/// Loads JSON documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl JsonLoader {
    /// Parse JSON text into a tree.
    pub fn parse_str(content: &str) -> Result<Node> {
        let raw: serde_json::Value = serde_json::from_str(content).map_err(SyntaxError::from)?;
        Ok(Node::from(raw))
    }
}

impl FormatLoader for JsonLoader {
    fn format(&self) -> Format {
        Format::Json
    }

    fn load(&self, ctx: &LoadContext<'_>) -> Result<Node> {
        let content = ctx.read_non_empty()?;
        tracing::debug!("Parsing JSON source: {:?}", ctx.source);
        Self::parse_str(&content)
    }
}
