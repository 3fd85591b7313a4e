//! Child process execution with concurrent stream draining
//!
//! Runs an external command, drains its stdout and stderr in parallel so it
//! can never stall on a full pipe, applies redirection and environment
//! changes, and hands back an [`ExecResult`], a captured string, or a
//! [`SafeResult`] depending on the entry point.
//!
//! # Entry points
//!
//! | Function | Non-zero exit | Engine failure |
//! |----------|---------------|----------------|
//! | [`execute`] | `Ok(ExecResult)` | `Err(ExecError)` |
//! | [`execute_or_fail`] | `Err(ExecError::TaskFailed)` | `Err(ExecError)` |
//! | [`execute_safe`] | `SafeResult { success: false, error: task_failure, .. }` | `SafeResult { success: false, .. }` |
//!
//! # Security Model
//!
//! All execution goes through [`TaskSpec`], which passes arguments argv-style.
//! No shell is involved unless the task itself names one.

pub mod config;
pub mod drain;
pub mod env;
pub mod error;
pub mod native;
pub mod result;
pub mod runner;
pub mod task;

pub use config::{
    ErrorTarget, ExecConfig, ExecConfigBuilder, FileRedirect, OutputTarget, RedirectMode,
};
pub use env::EnvChanges;
pub use error::{ConfigError, ErrorCategory, ErrorDescriptor, ExecError, TaskFailure};
pub use native::NativeExecutor;
pub use result::{ExecResult, SafeResult};
pub use runner::{TaskRunner, execute, execute_or_fail, execute_safe};
pub use task::TaskSpec;
