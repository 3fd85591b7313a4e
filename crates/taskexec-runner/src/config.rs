//! Execution options and their validation.
//!
//! Raw options arrive through [`ExecConfigBuilder`] or the string-keyed
//! [`ExecConfig::from_options`]. Both end in [`ExecConfigBuilder::build`],
//! which resolves the stdout and stderr destinations into enums so that a
//! validated [`ExecConfig`] can never hold contradictory redirections.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::warn;

use crate::error::ConfigError;

/// Recognized option names for string-keyed configuration.
pub mod keys {
    pub const TRIM: &str = "trim";
    pub const DIRECTORY: &str = "directory";
    pub const REDIRECT_OUT_PATH: &str = "redirect_out_path";
    pub const REDIRECT_OUT_MODE: &str = "redirect_out_mode";
    pub const REDIRECT_ERR_PATH: &str = "redirect_err_path";
    pub const REDIRECT_ERR_MODE: &str = "redirect_err_mode";
    pub const REDIRECT_ERR_TO_STDOUT: &str = "redirect_err_to_stdout";
}

/// How a redirect file treats existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// Create the file if absent, discard previous contents.
    Overwrite,
    /// Create the file if absent, keep previous contents and write after them.
    Append,
}

impl RedirectMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Append => "append",
        }
    }
}

impl FromStr for RedirectMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("overwrite") {
            Ok(Self::Overwrite)
        } else if s.eq_ignore_ascii_case("append") {
            Ok(Self::Append)
        } else {
            Err(s.to_string())
        }
    }
}

/// A stream destination on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRedirect {
    pub path: PathBuf,
    pub mode: RedirectMode,
}

impl FileRedirect {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, mode: RedirectMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    /// Open the file for the child to write into.
    pub fn open(&self) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.create(true);
        match self.mode {
            RedirectMode::Overwrite => options.write(true).truncate(true),
            RedirectMode::Append => options.append(true),
        };
        options.open(&self.path)
    }
}

/// Where the child's standard output goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Drain into the `out` text of the result.
    #[default]
    Capture,
    File(FileRedirect),
}

/// Where the child's standard error goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ErrorTarget {
    /// Drain into the `err` text of the result.
    #[default]
    Capture,
    /// Share standard output's destination.
    MergeIntoStdout,
    File(FileRedirect),
}

/// Validated execution configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecConfig {
    /// Strip leading/trailing whitespace from captured text.
    pub trim: bool,
    /// Working directory for the child; `None` inherits the caller's.
    pub directory: Option<PathBuf>,
    pub stdout: OutputTarget,
    pub stderr: ErrorTarget,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            trim: true,
            directory: None,
            stdout: OutputTarget::Capture,
            stderr: ErrorTarget::Capture,
        }
    }
}

impl ExecConfig {
    /// Create a builder for raw, not yet validated options.
    ///
    /// # Example
    ///
    /// ```rust
    /// use taskexec_runner::{ExecConfig, ErrorTarget, RedirectMode};
    ///
    /// let config = ExecConfig::builder()
    ///     .trim(false)
    ///     .redirect_err_path("build.log")
    ///     .redirect_err_mode(RedirectMode::Append)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(!config.trim);
    /// assert!(matches!(config.stderr, ErrorTarget::File(_)));
    /// ```
    #[must_use]
    pub fn builder() -> ExecConfigBuilder {
        ExecConfigBuilder::default()
    }

    /// Parse string-keyed options using the names in [`keys`].
    ///
    /// `trim` must be exactly `true` or `false`; `redirect_err_to_stdout`
    /// accepts either in any case, as do the redirect modes. Unknown keys are
    /// logged and ignored.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] raised while parsing values or by
    /// [`ExecConfigBuilder::build`].
    pub fn from_options<I, K, V>(options: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut builder = Self::builder();
        for (key, value) in options {
            let (key, value) = (key.as_ref(), value.as_ref());
            builder = match key {
                keys::TRIM => builder.trim(parse_bool(key, value, false)?),
                keys::DIRECTORY => builder.directory(value),
                keys::REDIRECT_OUT_PATH => builder.redirect_out_path(value),
                keys::REDIRECT_OUT_MODE => builder.redirect_out_mode(parse_mode(key, value)?),
                keys::REDIRECT_ERR_PATH => builder.redirect_err_path(value),
                keys::REDIRECT_ERR_MODE => builder.redirect_err_mode(parse_mode(key, value)?),
                keys::REDIRECT_ERR_TO_STDOUT => {
                    builder.redirect_err_to_stdout(parse_bool(key, value, true)?)
                }
                other => {
                    warn!(option = %other, "ignoring unrecognized execution option");
                    builder
                }
            };
        }
        builder.build()
    }

    /// Reject any stderr destination other than capture.
    ///
    /// # Errors
    ///
    /// [`ConfigError::StderrRedirectForbidden`] naming the offending option.
    pub fn require_captured_stderr(&self) -> Result<(), ConfigError> {
        match self.stderr {
            ErrorTarget::Capture => Ok(()),
            ErrorTarget::MergeIntoStdout => Err(ConfigError::StderrRedirectForbidden {
                option: keys::REDIRECT_ERR_TO_STDOUT,
            }),
            ErrorTarget::File(_) => Err(ConfigError::StderrRedirectForbidden {
                option: keys::REDIRECT_ERR_PATH,
            }),
        }
    }

    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }
}

/// Raw execution options, validated by [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct ExecConfigBuilder {
    trim: Option<bool>,
    directory: Option<PathBuf>,
    redirect_out_path: Option<PathBuf>,
    redirect_out_mode: Option<RedirectMode>,
    redirect_err_path: Option<PathBuf>,
    redirect_err_mode: Option<RedirectMode>,
    redirect_err_to_stdout: bool,
}

impl ExecConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trim captured text (default: true).
    #[must_use]
    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = Some(trim);
        self
    }

    #[must_use]
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = Some(dir.into());
        self
    }

    #[must_use]
    pub fn redirect_out_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.redirect_out_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn redirect_out_mode(mut self, mode: RedirectMode) -> Self {
        self.redirect_out_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn redirect_err_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.redirect_err_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn redirect_err_mode(mut self, mode: RedirectMode) -> Self {
        self.redirect_err_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn redirect_err_to_stdout(mut self, merge: bool) -> Self {
        self.redirect_err_to_stdout = merge;
        self
    }

    /// Resolve the options into an [`ExecConfig`].
    ///
    /// # Errors
    ///
    /// - a redirect path without its mode, or a mode without its path
    /// - merging stderr into stdout while also redirecting it to a file
    pub fn build(self) -> Result<ExecConfig, ConfigError> {
        let stdout = match file_redirect(
            self.redirect_out_path,
            self.redirect_out_mode,
            keys::REDIRECT_OUT_PATH,
            keys::REDIRECT_OUT_MODE,
        )? {
            Some(redirect) => OutputTarget::File(redirect),
            None => OutputTarget::Capture,
        };

        let stderr = match file_redirect(
            self.redirect_err_path,
            self.redirect_err_mode,
            keys::REDIRECT_ERR_PATH,
            keys::REDIRECT_ERR_MODE,
        )? {
            Some(_) if self.redirect_err_to_stdout => {
                return Err(ConfigError::ConflictingErrorTargets);
            }
            Some(redirect) => ErrorTarget::File(redirect),
            None if self.redirect_err_to_stdout => ErrorTarget::MergeIntoStdout,
            None => ErrorTarget::Capture,
        };

        Ok(ExecConfig {
            trim: self.trim.unwrap_or(true),
            directory: self.directory,
            stdout,
            stderr,
        })
    }
}

fn file_redirect(
    path: Option<PathBuf>,
    mode: Option<RedirectMode>,
    path_key: &'static str,
    mode_key: &'static str,
) -> Result<Option<FileRedirect>, ConfigError> {
    match (path, mode) {
        (Some(path), Some(mode)) => Ok(Some(FileRedirect::new(path, mode))),
        (Some(_), None) => Err(ConfigError::MissingRedirectMode { path_key, mode_key }),
        (None, Some(_)) => Err(ConfigError::MissingRedirectPath { mode_key, path_key }),
        (None, None) => Ok(None),
    }
}

fn parse_bool(key: &str, value: &str, ignore_case: bool) -> Result<bool, ConfigError> {
    let matches = |literal: &str| {
        if ignore_case {
            value.eq_ignore_ascii_case(literal)
        } else {
            value == literal
        }
    };
    if matches("true") {
        Ok(true)
    } else if matches("false") {
        Ok(false)
    } else {
        Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// Parse a redirect mode value for `key`.
///
/// # Errors
///
/// [`ConfigError::InvalidRedirectMode`] for anything but `overwrite`/`append`.
pub fn parse_mode(key: &str, value: &str) -> Result<RedirectMode, ConfigError> {
    value
        .parse()
        .map_err(|value| ConfigError::InvalidRedirectMode {
            key: key.to_string(),
            value,
        })
}
