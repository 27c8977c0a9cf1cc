// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cfgtree - Inspect layered configuration files
///
/// Loads YAML, JSON, TOML, PHP array and conf sources and queries them by
/// path.
#[derive(Parser, Debug)]
#[command(name = "cfgtree")]
#[command(author = "Eshan Roy")]
#[command(version)]
#[command(about = "Query and merge configuration trees", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Parser type to use instead of guessing from the file extension
    #[arg(short, long, global = true, env = "CFGTREE_FORMAT")]
    pub format: Option<String>,

    /// Path segment separator
    #[arg(short, long, global = true, default_value = ".")]
    pub separator: String,

    /// Directory relative source paths are resolved against
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Accept unbalanced <ifModule> blocks in conf sources
    #[arg(long, global = true)]
    pub lenient: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Output format for container values
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

/// Rendering of mappings and sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    Json,
    /// YAML
    Yaml,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the value at a path
    Get(GetArgs),

    /// Check whether a path is set
    Has(HasArgs),

    /// List the keys of a mapping
    Keys(KeysArgs),

    /// Merge sources left to right and print the result
    Dump(DumpArgs),

    /// Show version information
    Version,
}

/// Arguments for the get command.
#[derive(Parser, Debug, Clone)]
pub struct GetArgs {
    /// Config source file
    pub file: PathBuf,

    /// Path to the value, e.g. database.host
    pub path: String,

    /// Value printed when the path is not set
    #[arg(long)]
    pub default: Option<String>,

    /// Print the keys of a mapping instead of the mapping
    #[arg(short, long)]
    pub keys: bool,
}

/// Arguments for the has command.
#[derive(Parser, Debug, Clone)]
pub struct HasArgs {
    /// Config source file
    pub file: PathBuf,

    /// Path to check
    pub path: String,
}

/// Arguments for the keys command.
#[derive(Parser, Debug, Clone)]
pub struct KeysArgs {
    /// Config source file
    pub file: PathBuf,

    /// Path of the mapping (the root when omitted)
    pub path: Option<String>,
}

/// Arguments for the dump command.
#[derive(Parser, Debug, Clone)]
pub struct DumpArgs {
    /// Config source files, later files override earlier ones
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Only print the section at this path
    #[arg(long)]
    pub section: Option<String>,
}
