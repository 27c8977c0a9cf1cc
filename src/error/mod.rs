// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Error types for cfgtree.
//!
//! Errors are grouped by category. Loader failures are re-wrapped at the
//! registry boundary so the caller always sees which source and which
//! format failed, with the underlying error reachable through
//! [`std::error::Error::source`].

use crate::loaders::Format;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for cfgtree operations.
#[derive(Error, Debug)]
pub enum CfgError {
    // Config source and structure errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // Path resolution errors
    #[error("Path error: {0}")]
    Path(#[from] PathError),

    // Format-level content errors
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl CfgError {
    /// Whether this error describes a file-level failure (missing, unreadable
    /// or empty source) rather than bad content.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            CfgError::Io(_)
                | CfgError::Config(ConfigError::InvalidConfigSource { .. })
                | CfgError::Config(ConfigError::EmptyConfigSource { .. })
        )
    }
}

/// Config source and structure errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config section already loaded: {name}")]
    ConfigSectionAlreadyLoaded { name: String },

    #[error("Invalid config source [{path}]")]
    InvalidConfigSource { path: PathBuf },

    #[error("Config source [{path}] is empty")]
    EmptyConfigSource { path: PathBuf },

    #[error("Invalid config structure parsed from [{source_ref}] using [{format}]: {message}")]
    UnknownConfigSourceStructure {
        source_ref: String,
        format: Format,
        message: String,
    },

    #[error("Failed to load config source file [{source_ref}] using [{format}] parser.")]
    FailedToLoadConfigSource {
        source_ref: String,
        format: Format,
        #[source]
        cause: Option<Box<CfgError>>,
    },

    #[error("Failed to parse config source file [{source_ref}] using [{format}] parser.")]
    FailedToParseConfigSource {
        source_ref: String,
        format: Format,
        #[source]
        cause: Box<CfgError>,
    },

    #[error("Unknown parser type [{name}].")]
    UnknownParserType { name: String },

    #[error("Config value at '{path}' is not numeric: {found}")]
    TypeMismatch { path: String, found: String },
}

impl ConfigError {
    /// Wrap a loader failure for `source_ref`, classifying it as a file-level
    /// or a content-level failure.
    pub fn wrap_loader_failure(source_ref: impl Into<String>, format: Format, err: CfgError) -> Self {
        let source_ref = source_ref.into();
        if err.is_source_failure() {
            ConfigError::FailedToLoadConfigSource {
                source_ref,
                format,
                cause: Some(Box::new(err)),
            }
        } else {
            ConfigError::FailedToParseConfigSource {
                source_ref,
                format,
                cause: Box::new(err),
            }
        }
    }
}

/// Path resolution errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Path not found: '{path}'")]
    NotFound { path: String },

    #[error("Cannot descend into scalar at '{path}'")]
    NotAContainer { path: String },

    #[error("Sequence index '{segment}' out of range at '{path}'")]
    IndexOutOfRange { path: String, segment: String },

    #[error("Empty path does not address a settable value")]
    EmptyPath,
}

/// Format-level content errors.
#[derive(Error, Debug)]
pub enum SyntaxError {
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid PHP array at line {line}: {message}")]
    PhpArray { line: usize, message: String },

    #[error("Invalid conf directive at line {line}: {message}")]
    Conf { line: usize, message: String },

    #[error("Unclosed <ifModule {group}> block at end of input")]
    UnclosedScope { group: String },

    #[error("Include cycle detected: {chain}")]
    IncludeCycle { chain: String },
}

/// Result type alias for cfgtree operations.
pub type Result<T> = std::result::Result<T, CfgError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: std::error::Error + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CfgError::WithContext {
            context: context.into(),
            message: e.to_string(),
        })
    }
}
