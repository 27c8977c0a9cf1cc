// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Read access to one group of a config tree.

use crate::error::Result;
use crate::loaders::Format;
use crate::registry::ParserRegistry;
use crate::store::Node;
use std::path::Path;
use std::sync::Arc;

use super::ConfigHandle;

/// Something that exposes config settings by path.
pub trait ConfigExposure {
    /// The setting at `path`, or `default` when it is not set.
    fn config_setting(&self, path: &str, default: Node) -> Node;
}

impl ConfigExposure for ConfigHandle {
    fn config_setting(&self, path: &str, default: Node) -> Node {
        self.get(path, default)
    }
}

/// A shared handle read relative to a root group.
#[derive(Debug, Clone)]
pub struct ScopedConfig {
    handle: Arc<ConfigHandle>,
    root: String,
}

impl ScopedConfig {
    pub fn new(handle: Arc<ConfigHandle>, root: impl Into<String>) -> Self {
        Self {
            handle,
            root: root.into(),
        }
    }

    /// Load `source` through `registry` and scope it to `root`.
    pub fn load(
        registry: &ParserRegistry,
        format: Format,
        source: &Path,
        root: impl Into<String>,
    ) -> Result<Self> {
        let root = root.into();
        let handle = registry.load(format, Some(source))?;
        tracing::debug!("Scoped config [{}] loaded from {}", root, handle.source_ref());
        Ok(Self::new(handle, root))
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn handle(&self) -> &Arc<ConfigHandle> {
        &self.handle
    }

    fn full_path(&self, path: &str) -> String {
        self.handle.store().join_path(&self.root, path)
    }

    pub fn has(&self, path: &str) -> bool {
        self.handle.has(&self.full_path(path))
    }

    pub fn get(&self, path: &str, default: impl Into<Node>) -> Node {
        self.handle.get(&self.full_path(path), default)
    }
}

impl ConfigExposure for ScopedConfig {
    fn config_setting(&self, path: &str, default: Node) -> Node {
        self.get(path, default)
    }
}
