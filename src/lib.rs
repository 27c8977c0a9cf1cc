// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! cfgtree - Layered configuration trees
//!
//! Loads configuration sources in several formats into one tree model and
//! reads them back by delimiter-separated path.
//!
//! # Features
//!
//! - **Many formats**: YAML, JSON, TOML, PHP array literals, Apache-style
//!   `.conf` files and command-line arguments
//! - **Path access**: `database.slaves.0` style lookups with a configurable
//!   separator
//! - **Deep merge**: mappings merge key by key, sequences concatenate
//! - **Includes**: conf sources pull in other sources of any format, with
//!   cycle detection
//! - **Load once**: a registry parses every source at most once and hands
//!   out shared, immutable handles
//!
//! # Example
//!
//! ```no_run
//! use cfgtree::{Format, ParserRegistry};
//! use std::path::Path;
//!
//! let registry = ParserRegistry::new();
//! let config = registry.load(Format::Yaml, Some(Path::new("config/app.yml"))).unwrap();
//!
//! let host = config.get("database.host", "localhost");
//! println!("database host: {}", host);
//! ```

// Module declarations
pub mod cli;
pub mod config;
pub mod error;
pub mod loaders;
pub mod registry;
pub mod store;

// Re-exports for convenience
pub use config::{ConfigExposure, ConfigHandle, ConfigSections, RawSource, ScopedConfig, SectionScope};
pub use error::{CfgError, Result};
pub use loaders::{Format, FormatLoader};
pub use registry::{LoadRecord, ParserRegistry, RegistryOptions};
pub use store::{Mapping, Node, Number, Store};

/// Version information embedded at compile time.
pub mod version {
    /// The current version of cfgtree.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// The git SHA at compile time (if available).
    pub const GIT_SHA: Option<&str> = option_env!("VERGEN_GIT_SHA");

    /// The git commit date at compile time (if available).
    pub const GIT_COMMIT_DATE: Option<&str> = option_env!("VERGEN_GIT_COMMIT_DATE");

    /// Get a formatted version string.
    pub fn version_string() -> String {
        match (GIT_SHA, GIT_COMMIT_DATE) {
            (Some(sha), Some(date)) => {
                format!("{} ({} {})", VERSION, &sha[..7.min(sha.len())], date)
            }
            (Some(sha), None) => {
                format!("{} ({})", VERSION, &sha[..7.min(sha.len())])
            }
            _ => VERSION.to_string(),
        }
    }
}
