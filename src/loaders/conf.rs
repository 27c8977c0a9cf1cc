// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! BaSH/Apache style `.conf` loader.
//!
//! The format is line based:
//!
//! ```text
//! # comment, also ; and //
//! /* block
//!    comment */
//! name = value
//! <ifModule database>
//!     DatabaseSlave primary 10.0.0.1
//!     IncludeConfig JSON ./database.json
//! </ifModule>
//! ServerName example.org
//! ```
//!
//! `key = value` lines are type cast, `<ifModule NAME>` blocks group their
//! settings under `NAME`, and `IncludeConfig FORMAT FILE` merges another
//! source (of any format) into the current group or the root.

use crate::error::{Result, SyntaxError};
use crate::store::{cast_scalar, merge_mappings, Mapping, Node};
use std::path::{Path, PathBuf};

use super::{Format, FormatLoader, LoadContext};

const LINE_COMMENT_PREFIXES: [&str; 3] = ["#", ";", "//"];
const BLOCK_COMMENT_OPEN: &str = "/*";
const BLOCK_COMMENT_CLOSE: &str = "*/";

const SCOPE_OPEN: &str = "<ifModule";
const SCOPE_CLOSE: &str = "</ifModule>";
const INCLUDE_CONFIG: &str = "IncludeConfig";
const DATABASE_SLAVE: &str = "DatabaseSlave";
const LOAD_MODULE: &str = "LoadModule";

/// Mapping key that collects `DatabaseSlave` entries.
pub const DATABASE_SLAVES_KEY: &str = "database_slaves";

/// Loads `.conf` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfLoader;

impl FormatLoader for ConfLoader {
    fn format(&self) -> Format {
        Format::Conf
    }

    fn load(&self, ctx: &LoadContext<'_>) -> Result<Node> {
        let path = ctx.source_path()?;
        let content = ctx.read_to_string()?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        tracing::debug!("Parsing conf source: {}", path.display());
        ConfParser::new(ctx, base_dir).parse(&content).map(Node::Mapping)
    }
}

/// An open `<ifModule NAME>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseScope {
    /// The group name settings are collected under.
    pub group: String,
    /// Line the block was opened on.
    pub opened_at: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    Normal,
    InCommentBlock,
}

struct ConfParser<'c, 'a> {
    ctx: &'c LoadContext<'a>,
    base_dir: PathBuf,
    tree: Mapping,
    state: LineState,
    scope: Option<ParseScope>,
}

impl<'c, 'a> ConfParser<'c, 'a> {
    fn new(ctx: &'c LoadContext<'a>, base_dir: PathBuf) -> Self {
        Self {
            ctx,
            base_dir,
            tree: Mapping::new(),
            state: LineState::Normal,
            scope: None,
        }
    }

    fn strict(&self) -> bool {
        self.ctx.registry.options().strict_scopes
    }

    fn parse(mut self, content: &str) -> Result<Mapping> {
        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || self.is_comment_line(line) {
                continue;
            }
            self.parse_line(line, index + 1)?;
        }

        if let Some(scope) = self.scope.take() {
            if self.strict() {
                return Err(SyntaxError::UnclosedScope { group: scope.group }.into());
            }
            tracing::debug!(
                "Closing <ifModule {}> opened at line {} at end of input",
                scope.group,
                scope.opened_at
            );
        }
        Ok(self.tree)
    }

    /// Classify a line as comment, updating the block-comment state.
    fn is_comment_line(&mut self, line: &str) -> bool {
        match self.state {
            LineState::InCommentBlock => {
                if line.contains(BLOCK_COMMENT_CLOSE) {
                    self.state = LineState::Normal;
                }
                true
            }
            LineState::Normal => {
                if let Some(rest) = line.strip_prefix(BLOCK_COMMENT_OPEN) {
                    if !rest.contains(BLOCK_COMMENT_CLOSE) {
                        self.state = LineState::InCommentBlock;
                    }
                    return true;
                }
                LINE_COMMENT_PREFIXES
                    .iter()
                    .any(|prefix| line.starts_with(prefix))
            }
        }
    }

    fn parse_line(&mut self, line: &str, line_no: usize) -> Result<()> {
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                tracing::debug!("Setting without a name at line {}", line_no);
            }
            let value = cast_value(value.trim());
            self.target().insert(key.to_string(), value);
            return Ok(());
        }

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let command_key = parts.next().unwrap_or_default();
        let command_value = parts.collect::<Vec<_>>().join(" ");
        tracing::trace!("conf line {}: command '{}'", line_no, command);

        match command {
            SCOPE_OPEN => self.open_scope(command_key, line_no),
            SCOPE_CLOSE => self.close_scope(line_no),
            INCLUDE_CONFIG => self.include_config(command_key, &command_value, line_no),
            DATABASE_SLAVE => {
                self.add_database_slave(command_key, &command_value, line_no);
                Ok(())
            }
            LOAD_MODULE => {
                tracing::debug!("Ignoring LoadModule directive at line {}", line_no);
                Ok(())
            }
            _ => {
                let value = [command_key, command_value.as_str()]
                    .iter()
                    .filter(|part| !part.is_empty())
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" ");
                self.target().insert(command.to_string(), Node::String(value));
                Ok(())
            }
        }
    }

    /// The mapping new settings land in: the open group, or the root.
    fn target(&mut self) -> &mut Mapping {
        match &self.scope {
            Some(scope) => self
                .tree
                .entry(scope.group.clone())
                .or_insert_with(Node::empty_mapping)
                .make_mapping(),
            None => &mut self.tree,
        }
    }

    fn open_scope(&mut self, name: &str, line_no: usize) -> Result<()> {
        let group = name.trim_end_matches('>');
        if group.is_empty() {
            return Err(syntax(line_no, "<ifModule> requires a group name"));
        }
        if let Some(open) = &self.scope {
            if self.strict() {
                return Err(syntax(
                    line_no,
                    format!(
                        "nested <ifModule {}> inside <ifModule {}> opened at line {}",
                        group, open.group, open.opened_at
                    ),
                ));
            }
        }
        self.tree.insert(group.to_string(), Node::empty_mapping());
        self.scope = Some(ParseScope {
            group: group.to_string(),
            opened_at: line_no,
        });
        Ok(())
    }

    fn close_scope(&mut self, line_no: usize) -> Result<()> {
        if self.scope.take().is_none() {
            if self.strict() {
                return Err(syntax(line_no, "</ifModule> without an open block"));
            }
            tracing::warn!("Ignoring stray </ifModule> at line {}", line_no);
        }
        Ok(())
    }

    fn include_config(&mut self, format_name: &str, file: &str, line_no: usize) -> Result<()> {
        if format_name.is_empty() || file.is_empty() {
            return Err(syntax(line_no, "IncludeConfig requires a parser type and a file"));
        }
        let format: Format = format_name.parse().map_err(|_| {
            syntax(
                line_no,
                format!("unknown parser type [{}] for include [{}]", format_name, file),
            )
        })?;
        let resolved = self.resolve_include(file);
        tracing::debug!(
            "Including {} config [{}] from line {}",
            format,
            resolved.display(),
            line_no
        );

        let included = self
            .ctx
            .registry
            .load_included(format, &resolved, self.ctx.include_chain)?;
        merge_mappings(self.target(), included.to_mapping());
        Ok(())
    }

    /// Paths starting with `.` are relative to the including file.
    fn resolve_include(&self, file: &str) -> PathBuf {
        if file.starts_with('.') {
            self.base_dir.join(file)
        } else {
            PathBuf::from(file)
        }
    }

    /// Missing parts are stored as empty strings.
    fn add_database_slave(&mut self, name: &str, host: &str, line_no: usize) {
        if name.is_empty() || host.is_empty() {
            tracing::debug!("Incomplete DatabaseSlave directive at line {}", line_no);
        }
        self.target()
            .entry(DATABASE_SLAVES_KEY.to_string())
            .or_insert_with(Node::empty_mapping)
            .make_mapping()
            .insert(host.to_string(), Node::String(name.to_string()));
    }
}

/// Quoted values stay strings, everything else is type cast.
fn cast_value(raw: &str) -> Node {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return Node::String(raw[1..raw.len() - 1].to_string());
        }
    }
    cast_scalar(raw)
}

fn syntax(line: usize, message: impl Into<String>) -> crate::error::CfgError {
    SyntaxError::Conf {
        line,
        message: message.into(),
    }
    .into()
}
