// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Format loaders.
//!
//! Each loader turns one kind of raw source into a [`Node`] tree. Loaders
//! are stateless; everything a load needs travels in a [`LoadContext`].

mod cli;
mod conf;
mod json;
mod php_array;
mod toml_doc;
mod yaml;

pub use cli::{parse_arguments, CliLoader};
pub use conf::{ConfLoader, ParseScope};
pub use json::JsonLoader;
pub use php_array::{parse_php_array, PhpArrayLoader};
pub use toml_doc::TomlLoader;
pub use yaml::YamlLoader;

use crate::error::{CfgError, ConfigError, Result};
use crate::registry::ParserRegistry;
use crate::store::Node;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supported config source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Yaml,
    Conf,
    PhpArray,
    Json,
    Cli,
    Toml,
}

impl Format {
    /// Every built-in format.
    pub const ALL: [Format; 6] = [
        Format::Yaml,
        Format::Conf,
        Format::PhpArray,
        Format::Json,
        Format::Cli,
        Format::Toml,
    ];

    /// The registry identifier of this format.
    pub fn identifier(self) -> &'static str {
        match self {
            Format::Yaml => "YAML",
            Format::Conf => "CONF",
            Format::PhpArray => "PHP_ARRAY",
            Format::Json => "JSON",
            Format::Cli => "CLI",
            Format::Toml => "TOML",
        }
    }

    /// Whether sources of this format are files.
    pub fn is_file_based(self) -> bool {
        self != Format::Cli
    }

    /// Guess the format from a file extension.
    pub fn from_extension(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yml" | "yaml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            "php" => Some(Format::PhpArray),
            "conf" | "cfg" => Some(Format::Conf),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }

    /// The loader registered for this format.
    pub fn loader(self) -> &'static dyn FormatLoader {
        match self {
            Format::Yaml => &YamlLoader,
            Format::Conf => &ConfLoader,
            Format::PhpArray => &PhpArrayLoader,
            Format::Json => &JsonLoader,
            Format::Cli => &CliLoader,
            Format::Toml => &TomlLoader,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "YAML" | "YML" => Ok(Format::Yaml),
            "CONF" => Ok(Format::Conf),
            "PHP_ARRAY" | "PHPARRAY" | "PHP" => Ok(Format::PhpArray),
            "JSON" => Ok(Format::Json),
            "CLI" => Ok(Format::Cli),
            "TOML" => Ok(Format::Toml),
            _ => Err(ConfigError::UnknownParserType {
                name: s.to_string(),
            }),
        }
    }
}

/// A parser for one source format.
pub trait FormatLoader {
    /// The format this loader handles.
    fn format(&self) -> Format;

    /// Load and parse the source described by `ctx`.
    fn load(&self, ctx: &LoadContext<'_>) -> Result<Node>;
}

/// Everything a loader needs for one load.
#[derive(Clone, Copy)]
pub struct LoadContext<'a> {
    /// The registry performing the load; used for nested includes.
    pub registry: &'a ParserRegistry,
    /// The resolved source file, `None` for CLI loads.
    pub source: Option<&'a Path>,
    /// Files currently being loaded, outermost first, ending with `source`.
    pub include_chain: &'a [PathBuf],
}

impl<'a> LoadContext<'a> {
    /// The source file, failing for source-less loads.
    pub fn source_path(&self) -> Result<&'a Path> {
        self.source.ok_or_else(|| {
            CfgError::Config(ConfigError::InvalidConfigSource {
                path: PathBuf::new(),
            })
        })
    }

    /// Read the source file into a string.
    pub fn read_to_string(&self) -> Result<String> {
        let path = self.source_path()?;
        Ok(std::fs::read_to_string(path)?)
    }

    /// Read the source file, treating whitespace-only content as a
    /// file-level failure.
    pub fn read_non_empty(&self) -> Result<String> {
        let content = self.read_to_string()?;
        if content.trim().is_empty() {
            return Err(ConfigError::EmptyConfigSource {
                path: self.source_path()?.to_path_buf(),
            }
            .into());
        }
        Ok(content)
    }
}
