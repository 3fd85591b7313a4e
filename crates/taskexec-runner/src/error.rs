//! Error types for task execution

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Invalid or contradictory execution options, detected before any process
/// is started.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Task must contain at least one element (the executable)")]
    EmptyTask,

    #[error("Task executable must not be an empty string")]
    EmptyProgram,

    #[error("Task element {index} contains a NUL byte")]
    NulInTask { index: usize },

    #[error("Illegal value '{value}' for '{key}'; expected 'true' or 'false'")]
    InvalidBool { key: String, value: String },

    #[error(
        "Field '{path_key}' is set, but '{mode_key}' is not; redirect mode must be 'overwrite' or 'append'"
    )]
    MissingRedirectMode {
        path_key: &'static str,
        mode_key: &'static str,
    },

    #[error("Field '{mode_key}' is set, but '{path_key}' is not")]
    MissingRedirectPath {
        mode_key: &'static str,
        path_key: &'static str,
    },

    #[error("Illegal value '{value}' for '{key}'; expected 'overwrite' or 'append'")]
    InvalidRedirectMode { key: String, value: String },

    #[error(
        "Cannot both merge standard error into standard output and redirect standard error to a file"
    )]
    ConflictingErrorTargets,

    #[error("Option '{option}' is not allowed when failing on task error; stderr must be captured")]
    StderrRedirectForbidden { option: &'static str },
}

/// A task that ran to completion but exited with a non-zero code.
///
/// The exit code is the sentinel [`TaskFailure::NO_EXIT_CODE`] when no
/// meaningful code exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TaskFailure {
    message: String,
    exit_code: i32,
}

impl TaskFailure {
    /// Exit code reported when the process never produced one.
    pub const NO_EXIT_CODE: i32 = -1;

    #[must_use]
    pub fn new(message: impl Into<String>, exit_code: i32) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Build the failure for `task` exiting with `exit_code`, appending the
    /// captured stderr when there is any.
    #[must_use]
    pub fn for_task(task: &str, exit_code: i32, stderr: Option<&str>) -> Self {
        let mut message = format!("Executing task '{task}' failed with exit value {exit_code}.");
        if let Some(err) = stderr.filter(|err| !err.is_empty()) {
            message.push_str("  ");
            message.push_str(err);
        }
        Self::new(message, exit_code)
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

/// Every way an execution call can fail.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Invalid execution configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start task '{task}': {source}")]
    Spawn {
        task: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open redirect file {}: {source}", path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while {context} for task '{task}': {source}")]
    Io {
        task: String,
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Draining {stream} of task '{task}' was interrupted")]
    Interrupted { task: String, stream: &'static str },

    #[error(transparent)]
    TaskFailed(#[from] TaskFailure),
}

impl ExecError {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Spawn { .. } => ErrorCategory::Start,
            Self::Redirect { .. } | Self::Io { .. } => ErrorCategory::Io,
            Self::Interrupted { .. } => ErrorCategory::Interrupted,
            Self::TaskFailed(_) => ErrorCategory::TaskFailure,
        }
    }

    /// The task's exit code, when the error is a task failure.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::TaskFailed(failure) => Some(failure.exit_code()),
            _ => None,
        }
    }
}

/// Categories of failure, used to group errors without matching variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Start,
    Io,
    Interrupted,
    TaskFailure,
    UnsupportedPlatform,
}

impl ErrorCategory {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Start => "start",
            Self::Io => "io",
            Self::Interrupted => "interrupted",
            Self::TaskFailure => "task_failure",
            Self::UnsupportedPlatform => "unsupported_platform",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category plus rendered message, stored in place of an error that was
/// not allowed to escape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDescriptor {
    pub category: ErrorCategory,
    pub message: String,
}

impl ErrorDescriptor {
    #[must_use]
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_error(err: &ExecError) -> Self {
        Self::new(err.category(), err.to_string())
    }
}

impl fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}
