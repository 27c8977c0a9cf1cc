// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Parser registry: picks the loader for a format and caches loaded handles.
//!
//! Every source is parsed at most once per registry. A second load of the
//! same source with the same format returns the same [`Arc<ConfigHandle>`].
//!
//! Each cache key owns a slot that is held while its source is parsed, so
//! concurrent first loads of one source wait for a single parse. Includes
//! lock further slots while the parent's is held; two threads entering the
//! same include cycle from opposite ends can therefore block each other.

mod options;

pub use options::RegistryOptions;

use crate::config::{ConfigHandle, RawSource};
use crate::error::{CfgError, ConfigError, Result, SyntaxError};
use crate::loaders::{Format, FormatLoader, LoadContext};
use lazy_static::lazy_static;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source reference used for the command-line source.
pub const CLI_SOURCE_REF: &str = "cli://argv";

lazy_static! {
    static ref GLOBAL_REGISTRY: ParserRegistry = ParserRegistry::new();
}

/// One cached load.
#[derive(Debug, Clone)]
pub struct LoadRecord {
    pub source_hash: String,
    pub format: Format,
    pub source_ref: String,
    pub handle: Arc<ConfigHandle>,
}

/// `None` until the first successful load of the key.
type Slot = Arc<Mutex<Option<LoadRecord>>>;

/// Loads config sources and remembers the result.
#[derive(Debug, Default)]
pub struct ParserRegistry {
    options: RegistryOptions,
    cache: Mutex<HashMap<String, Slot>>,
}

impl ParserRegistry {
    /// Create a registry with default options.
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            options,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide registry with default options.
    ///
    /// Prefer an explicit registry passed to whoever needs it; this exists
    /// for code that cannot thread one through.
    pub fn global() -> &'static ParserRegistry {
        &GLOBAL_REGISTRY
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Look up the loader for a format identifier such as `"YAML"`.
    pub fn get_loader(&self, name: &str) -> Result<&'static dyn FormatLoader> {
        let format: Format = name.parse()?;
        Ok(format.loader())
    }

    /// Load a source with the given format.
    ///
    /// File-based formats require `source`; the CLI format ignores it.
    pub fn load(&self, format: Format, source: Option<&Path>) -> Result<Arc<ConfigHandle>> {
        self.load_with_chain(format, source, &[])
    }

    /// Load a source, naming the format by its identifier.
    pub fn load_named(&self, format: &str, source: Option<&Path>) -> Result<Arc<ConfigHandle>> {
        let format: Format = format.parse()?;
        self.load(format, source)
    }

    /// Load a file, inferring the format from its extension.
    pub fn load_file(&self, path: &Path) -> Result<Arc<ConfigHandle>> {
        let format = Format::from_extension(path).ok_or_else(|| ConfigError::UnknownParserType {
            name: path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })?;
        self.load(format, Some(path))
    }

    /// Load a file included from another source currently being parsed.
    pub(crate) fn load_included(
        &self,
        format: Format,
        path: &Path,
        chain: &[PathBuf],
    ) -> Result<Arc<ConfigHandle>> {
        self.load_with_chain(format, Some(path), chain)
    }

    /// Whether a source has already been loaded with `format`.
    pub fn is_loaded(&self, format: Format, source: Option<&Path>) -> bool {
        let key = match self.cache_key(format, source) {
            Some((key, _)) => key,
            None => return false,
        };
        let slot = self.cache.lock().get(&key).cloned();
        slot.map_or(false, |slot| slot.lock().is_some())
    }

    /// Every cached load.
    pub fn records(&self) -> Vec<LoadRecord> {
        self.slots()
            .iter()
            .filter_map(|slot| slot.lock().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots().iter().filter(|slot| slot.lock().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Slot locks are never taken while the map lock is held.
    fn slots(&self) -> Vec<Slot> {
        self.cache.lock().values().cloned().collect()
    }

    fn load_with_chain(
        &self,
        format: Format,
        source: Option<&Path>,
        chain: &[PathBuf],
    ) -> Result<Arc<ConfigHandle>> {
        if !format.is_file_based() {
            return self.load_source(format, None, CLI_SOURCE_REF.to_string(), chain);
        }

        let requested = source.ok_or_else(|| missing_source(format, PathBuf::new()))?;
        let resolved = self.options.resolve(requested);
        if !resolved.is_file() {
            return Err(missing_source(format, resolved).into());
        }
        let canonical = resolved.canonicalize().map_err(|err| {
            ConfigError::FailedToLoadConfigSource {
                source_ref: resolved.display().to_string(),
                format,
                cause: Some(Box::new(CfgError::Io(err))),
            }
        })?;

        if chain.contains(&canonical) {
            let mut names: Vec<String> = chain.iter().map(|p| p.display().to_string()).collect();
            names.push(canonical.display().to_string());
            return Err(SyntaxError::IncludeCycle {
                chain: names.join(" -> "),
            }
            .into());
        }

        let source_ref = canonical.display().to_string();
        self.load_source(format, Some(&canonical), source_ref, chain)
    }

    fn load_source(
        &self,
        format: Format,
        path: Option<&Path>,
        source_ref: String,
        chain: &[PathBuf],
    ) -> Result<Arc<ConfigHandle>> {
        let key = source_hash(&source_ref, format);
        let slot = Arc::clone(self.cache.lock().entry(key.clone()).or_default());
        let mut slot = slot.lock();
        if let Some(record) = slot.as_ref() {
            tracing::debug!("Config cache hit for {} [{}]", source_ref, format);
            return Ok(Arc::clone(&record.handle));
        }
        tracing::debug!("Loading {} using {} parser", source_ref, format);

        let mut include_chain = chain.to_vec();
        if let Some(path) = path {
            include_chain.push(path.to_path_buf());
        }
        let ctx = LoadContext {
            registry: self,
            source: path,
            include_chain: &include_chain,
        };

        let tree = format
            .loader()
            .load(&ctx)
            .map_err(|err| ConfigError::wrap_loader_failure(source_ref.as_str(), format, err))?;
        let handle = ConfigHandle::create(RawSource::Tree(tree), source_ref.as_str(), format)?
            .with_path_separator(&self.options.path_separator);

        let handle = Arc::new(handle);
        *slot = Some(LoadRecord {
            source_hash: key,
            format,
            source_ref,
            handle: Arc::clone(&handle),
        });
        Ok(handle)
    }

    fn cache_key(&self, format: Format, source: Option<&Path>) -> Option<(String, String)> {
        let source_ref = if format.is_file_based() {
            let resolved = self.options.resolve(source?);
            resolved.canonicalize().ok()?.display().to_string()
        } else {
            CLI_SOURCE_REF.to_string()
        };
        Some((source_hash(&source_ref, format), source_ref))
    }
}

fn missing_source(format: Format, path: PathBuf) -> ConfigError {
    ConfigError::FailedToLoadConfigSource {
        source_ref: path.display().to_string(),
        format,
        cause: Some(Box::new(ConfigError::InvalidConfigSource { path }.into())),
    }
}

/// Stable content address of a source: the first 16 hex chars of
/// `sha256("{source_ref}-{FORMAT}")`.
pub fn source_hash(source_ref: &str, format: Format) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}-{}", source_ref, format.identifier()).as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)[..16].to_string()
}
