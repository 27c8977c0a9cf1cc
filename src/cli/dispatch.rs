// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Command dispatch and execution.

use crate::config::ConfigHandle;
use crate::error::{CfgError, PathError, Result, ResultExt};
use crate::registry::{ParserRegistry, RegistryOptions};
use crate::store::Node;
use console::style;
use std::path::Path;
use std::sync::Arc;

use super::args::{Cli, Commands, DumpArgs, GetArgs, HasArgs, KeysArgs, OutputFormat};

/// Run the CLI with the given arguments.
pub fn run(cli: Cli) -> Result<()> {
    let registry = build_registry(&cli);

    match &cli.command {
        Commands::Get(args) => run_get(&cli, &registry, args),
        Commands::Has(args) => run_has(&cli, &registry, args),
        Commands::Keys(args) => run_keys(&cli, &registry, args),
        Commands::Dump(args) => run_dump(&cli, &registry, args),
        Commands::Version => run_version(),
    }
}

fn build_registry(cli: &Cli) -> ParserRegistry {
    let mut options = RegistryOptions::default()
        .with_path_separator(cli.separator.as_str())
        .with_strict_scopes(!cli.lenient);
    if let Some(dir) = &cli.base_dir {
        options = options.with_base_dir(dir);
    }
    ParserRegistry::with_options(options)
}

/// Load one source, honouring a `--format` override.
fn load_source(cli: &Cli, registry: &ParserRegistry, file: &Path) -> Result<Arc<ConfigHandle>> {
    match &cli.format {
        Some(format) => registry.load_named(format, Some(file)),
        None => registry.load_file(file),
    }
}

/// Run the get command.
fn run_get(cli: &Cli, registry: &ParserRegistry, args: &GetArgs) -> Result<()> {
    tracing::debug!("Running get command with args: {:?}", args);

    let handle = load_source(cli, registry, &args.file)?;
    let default = match &args.default {
        Some(value) => Node::String(value.clone()),
        None => Node::Bool(false),
    };
    let value = if args.keys {
        handle.get_keys_at(&args.path, default)
    } else {
        handle.get(&args.path, default)
    };

    println!("{}", render(&value, cli.output)?);
    Ok(())
}

/// Run the has command.
fn run_has(cli: &Cli, registry: &ParserRegistry, args: &HasArgs) -> Result<()> {
    tracing::debug!("Running has command with args: {:?}", args);

    let handle = load_source(cli, registry, &args.file)?;
    if handle.has(&args.path) {
        println!("{} {}", style("✓").green(), args.path);
        Ok(())
    } else {
        println!("{} {}", style("✗").red(), args.path);
        Err(PathError::NotFound {
            path: args.path.clone(),
        }
        .into())
    }
}

/// Run the keys command.
fn run_keys(cli: &Cli, registry: &ParserRegistry, args: &KeysArgs) -> Result<()> {
    tracing::debug!("Running keys command with args: {:?}", args);

    let handle = load_source(cli, registry, &args.file)?;
    let path = args.path.as_deref().unwrap_or_default();
    let keys = match handle.lookup(path) {
        Some(Node::Mapping(map)) => map.keys().cloned().collect::<Vec<_>>(),
        Some(Node::Sequence(items)) => (0..items.len()).map(|i| i.to_string()).collect(),
        Some(_) => {
            return Err(PathError::NotAContainer {
                path: path.to_string(),
            }
            .into())
        }
        None => {
            return Err(PathError::NotFound {
                path: path.to_string(),
            }
            .into())
        }
    };

    for key in keys {
        println!("{}", key);
    }
    Ok(())
}

/// Run the dump command.
fn run_dump(cli: &Cli, registry: &ParserRegistry, args: &DumpArgs) -> Result<()> {
    tracing::debug!("Running dump command with args: {:?}", args);

    let mut merged: Option<ConfigHandle> = None;
    for file in &args.files {
        let handle = load_source(cli, registry, file)?;
        merged = Some(match merged {
            Some(base) => base.import_config(&handle),
            None => ConfigHandle::clone(&handle),
        });
    }
    let merged = merged.ok_or_else(|| CfgError::WithContext {
        context: "dump".to_string(),
        message: "no config sources given".to_string(),
    })?;

    let merged = match &args.section {
        Some(section) => merged.get_sub_section(section)?,
        None => merged,
    };

    println!("{}", render(&Node::Mapping(merged.to_mapping()), cli.output)?);
    Ok(())
}

/// Run the version command.
fn run_version() -> Result<()> {
    println!("cfgtree {}", crate::version::version_string());

    if let Some(sha) = crate::version::GIT_SHA {
        println!("git commit: {}", sha);
    }
    if let Some(date) = crate::version::GIT_COMMIT_DATE {
        println!("commit date: {}", date);
    }

    Ok(())
}

/// Scalars print raw, containers in the requested format.
fn render(value: &Node, output: OutputFormat) -> Result<String> {
    if !value.is_container() {
        return Ok(value.to_string());
    }
    let rendered = match output {
        OutputFormat::Json => serde_json::to_string_pretty(value).context("render JSON")?,
        OutputFormat::Yaml => serde_yaml::to_string(value).context("render YAML")?,
    };
    Ok(rendered.trim_end().to_string())
}
