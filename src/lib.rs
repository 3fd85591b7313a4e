//! taskexec - run external commands and get predictable, structured results
//!
//! Launches a child process, drains its stdout and stderr concurrently so it
//! never deadlocks on a full pipe, applies redirection and environment
//! changes, and reports the outcome as data or as a typed error.
//!
//! taskexec can be used in two ways:
//! - **CLI**: `taskexec run -- <task>...` and friends
//! - **Library**: call [`execute`], [`execute_or_fail`] or [`execute_safe`]
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Capture output and exit with the task's own code
//! taskexec run -- git rev-parse HEAD
//!
//! # Fail on non-zero exit, printing the captured stderr
//! taskexec strict --dir /tmp -- make check
//!
//! # Always succeed, printing a JSON result
//! taskexec safe --env RUST_LOG=debug -- ./flaky.sh
//!
//! # Lint a shell script with shellcheck
//! taskexec validate deploy.sh
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use taskexec::{EnvChanges, ExecConfig, TaskSpec, execute};
//!
//! let task = TaskSpec::new("ls").arg("-la");
//! let config = ExecConfig::builder().directory("/tmp").build().unwrap();
//! let env = EnvChanges::new().set("LC_ALL", "C");
//!
//! let result = execute(&task, &config, &env).unwrap();
//! println!("exit {}: {}", result.exit_code, result.out.unwrap_or_default());
//! ```
//!
//! # Stable Public API
//!
//! - [`TaskSpec`], [`ExecConfig`], [`ExecConfigBuilder`], [`EnvChanges`] - inputs
//! - [`ExecResult`], [`SafeResult`] - outcomes
//! - [`ExecError`], [`ConfigError`], [`TaskFailure`], [`ErrorCategory`] - failures
//! - [`TaskRunner`], [`NativeExecutor`] - the execution seam
//! - [`ScriptValidator`], [`ScriptReport`] - script linting
//! - [`ExitCode`] - CLI exit codes

pub use taskexec_runner::{
    ConfigError, EnvChanges, ErrorCategory, ErrorDescriptor, ErrorTarget, ExecConfig,
    ExecConfigBuilder, ExecError, ExecResult, FileRedirect, NativeExecutor, OutputTarget,
    RedirectMode, SafeResult, TaskFailure, TaskRunner, TaskSpec, execute, execute_or_fail,
    execute_safe,
};

pub use taskexec_validation::{Platform, ScriptReport, ScriptValidator, ValidationError};

pub use exit_codes::ExitCode;

pub mod cli;
pub mod config;
pub mod exit_codes;
pub mod logging;
