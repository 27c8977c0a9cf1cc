// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Registry options.

use crate::store::DEFAULT_PATH_SEPARATOR;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Options applied to every load made through a [`ParserRegistry`].
///
/// [`ParserRegistry`]: super::ParserRegistry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Relative source paths are resolved against this directory.
    pub base_dir: Option<PathBuf>,
    /// Path separator given to every loaded handle.
    pub path_separator: String,
    /// Treat unbalanced `<ifModule>` blocks in conf sources as errors.
    pub strict_scopes: bool,
    /// Arguments for the CLI loader. `None` means the process arguments.
    pub cli_args: Option<Vec<String>>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            path_separator: DEFAULT_PATH_SEPARATOR.to_string(),
            strict_scopes: true,
            cli_args: None,
        }
    }
}

impl RegistryOptions {
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn with_path_separator(mut self, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        self.path_separator = if separator.is_empty() {
            DEFAULT_PATH_SEPARATOR.to_string()
        } else {
            separator
        };
        self
    }

    pub fn with_strict_scopes(mut self, strict: bool) -> Self {
        self.strict_scopes = strict;
        self
    }

    pub fn with_cli_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cli_args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Like [`with_cli_args`](Self::with_cli_args), for OS strings.
    /// Invalid UTF-8 is replaced with U+FFFD.
    pub fn with_cli_args_os<I>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        self.cli_args = Some(lossy_args(args));
        self
    }

    /// The argument vector the CLI loader reads, without the program name.
    pub fn cli_args(&self) -> Vec<String> {
        match &self.cli_args {
            Some(args) => args.clone(),
            None => lossy_args(std::env::args_os().skip(1)),
        }
    }

    /// Resolve a source path against `base_dir`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn lossy_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<String> {
    args.into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RegistryOptions::default();
        assert_eq!(options.path_separator, ".");
        assert!(options.strict_scopes);
        assert!(options.base_dir.is_none());
    }

    #[test]
    fn test_empty_separator_falls_back() {
        let options = RegistryOptions::default().with_path_separator("");
        assert_eq!(options.path_separator, ".");
    }

    #[test]
    fn test_resolve_relative_only() {
        let options = RegistryOptions::default().with_base_dir("/etc/app");
        assert_eq!(options.resolve(Path::new("app.yml")), PathBuf::from("/etc/app/app.yml"));
        assert_eq!(options.resolve(Path::new("/tmp/x.yml")), PathBuf::from("/tmp/x.yml"));
    }

    #[test]
    fn test_explicit_cli_args() {
        let options = RegistryOptions::default().with_cli_args(["--a=1", "-b"]);
        assert_eq!(options.cli_args(), vec!["--a=1", "-b"]);
    }

    #[test]
    fn test_process_args_are_read() {
        // the test harness always has at least the program name
        let options = RegistryOptions::default();
        assert_eq!(options.cli_args().len(), std::env::args_os().count() - 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_args_are_replaced() {
        use std::os::unix::ffi::OsStringExt;

        let args = vec![
            OsString::from_vec(b"--name=\xff".to_vec()),
            OsString::from_vec(vec![b'-', 0xff]),
            OsString::from("--ok=1"),
        ];
        let options = RegistryOptions::default().with_cli_args_os(args);
        assert_eq!(
            options.cli_args(),
            vec!["--name=\u{FFFD}", "-\u{FFFD}", "--ok=1"]
        );
    }
}
