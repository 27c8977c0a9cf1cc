// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Named config sections with access scopes.

use crate::error::{ConfigError, Result};
use crate::loaders::Format;
use crate::registry::ParserRegistry;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::ConfigHandle;

/// Visibility of a named section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SectionScope {
    #[default]
    Public,
    Protected,
    Private,
}

impl fmt::Display for SectionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionScope::Public => "public",
            SectionScope::Protected => "protected",
            SectionScope::Private => "private",
        };
        f.write_str(name)
    }
}

/// Config sources loaded under names, one source per name and scope.
pub struct ConfigSections<'r> {
    registry: &'r ParserRegistry,
    sections: HashMap<(SectionScope, String), Arc<ConfigHandle>>,
}

impl<'r> ConfigSections<'r> {
    pub fn new(registry: &'r ParserRegistry) -> Self {
        Self {
            registry,
            sections: HashMap::new(),
        }
    }

    /// Load `source` into the section `name`.
    ///
    /// Loading the same source under the same name again returns the
    /// existing handle; loading a different source into a used name fails
    /// with [`ConfigError::ConfigSectionAlreadyLoaded`].
    pub fn load(
        &mut self,
        name: &str,
        format: Format,
        source: &Path,
        scope: SectionScope,
    ) -> Result<Arc<ConfigHandle>> {
        let handle = self.registry.load(format, Some(source))?;
        let key = (scope, name.to_string());

        if let Some(existing) = self.sections.get(&key) {
            if Arc::ptr_eq(existing, &handle) {
                tracing::debug!("Section {}.{} already holds {}", scope, name, handle.source_ref());
                return Ok(Arc::clone(existing));
            }
            return Err(ConfigError::ConfigSectionAlreadyLoaded {
                name: format!("{}.{}", scope, name),
            }
            .into());
        }

        tracing::debug!("Loaded {} into section {}.{}", handle.source_ref(), scope, name);
        self.sections.insert(key, Arc::clone(&handle));
        Ok(handle)
    }

    pub fn is_loaded(&self, name: &str, scope: SectionScope) -> bool {
        self.sections.contains_key(&(scope, name.to_string()))
    }

    pub fn get(&self, name: &str, scope: SectionScope) -> Option<Arc<ConfigHandle>> {
        self.sections.get(&(scope, name.to_string())).cloned()
    }

    /// Section names in `scope`, sorted.
    pub fn names(&self, scope: SectionScope) -> Vec<String> {
        let mut names: Vec<String> = self
            .sections
            .keys()
            .filter(|(s, _)| *s == scope)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }
}
