// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Command-line argument loader.
//!
//! `--name=value` becomes a string setting, `-flag` and `--flag` become
//! boolean `true`. Positional arguments are ignored.

use crate::error::Result;
use crate::store::{Mapping, Node};

use super::{Format, FormatLoader, LoadContext};

/// Loads settings from the registry's argument vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliLoader;

impl FormatLoader for CliLoader {
    fn format(&self) -> Format {
        Format::Cli
    }

    fn load(&self, ctx: &LoadContext<'_>) -> Result<Node> {
        let args = ctx.registry.options().cli_args();
        tracing::debug!("Parsing {} command line arguments", args.len());
        Ok(Node::Mapping(parse_arguments(args)))
    }
}

/// Parse an argument list into settings.
pub fn parse_arguments<I, S>(args: I) -> Mapping
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut settings = Mapping::new();
    for arg in args {
        if let Some((name, value)) = parse_argument(arg.as_ref()) {
            settings.insert(name, value);
        }
    }
    settings
}

fn parse_argument(arg: &str) -> Option<(String, Node)> {
    if let Some(option) = arg.strip_prefix("--") {
        if let Some((name, value)) = option.split_once('=') {
            if name.is_empty() {
                return None;
            }
            return Some((name.to_string(), Node::String(value.to_string())));
        }
    }
    if !arg.starts_with('-') {
        return None;
    }
    let flag = arg.trim_start_matches('-');
    if flag.is_empty() {
        return None;
    }
    Some((flag.to_string(), Node::Bool(true)))
}
