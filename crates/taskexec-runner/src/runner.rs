use crate::config::ExecConfig;
use crate::env::EnvChanges;
use crate::error::ExecError;
use crate::native::NativeExecutor;
use crate::result::{ExecResult, SafeResult};
use crate::task::TaskSpec;

// ============================================================================
// TaskRunner Trait - execution seam
// ============================================================================

/// Runs a task and reports its outcome in one of three shapes.
///
/// Implementations provide [`run`](Self::run); the throwing and the
/// error-swallowing shapes are derived from it.
///
/// # Threading
///
/// `TaskRunner` is synchronous. Implementations may use worker threads
/// internally but every call returns only after the child has terminated.
///
/// # Example
///
/// ```rust,no_run
/// use taskexec_runner::{EnvChanges, ExecConfig, NativeExecutor, TaskRunner, TaskSpec};
///
/// let runner = NativeExecutor::new();
/// let task = TaskSpec::new("git").arg("rev-parse").arg("HEAD");
///
/// let head = runner
///     .run_or_fail(&task, &ExecConfig::default(), &EnvChanges::default())
///     .unwrap();
/// println!("HEAD is {head}");
/// ```
pub trait TaskRunner {
    /// Execute `task` with `config` and `env` applied.
    ///
    /// # Returns
    ///
    /// * `Ok(ExecResult)` - the task ran, whatever its exit code
    /// * `Err(ExecError)` - configuration, start, I/O or interruption failure
    fn run(
        &self,
        task: &TaskSpec,
        config: &ExecConfig,
        env: &EnvChanges,
    ) -> Result<ExecResult, ExecError>;

    /// Execute `task` and return its captured stdout, failing on non-zero exit.
    ///
    /// Stderr must be captured so the failure can carry it; merging or
    /// redirecting it is a configuration error.
    ///
    /// # Errors
    ///
    /// [`ExecError::TaskFailed`] on non-zero exit, otherwise as [`run`](Self::run).
    fn run_or_fail(
        &self,
        task: &TaskSpec,
        config: &ExecConfig,
        env: &EnvChanges,
    ) -> Result<String, ExecError> {
        config.require_captured_stderr()?;
        let result = self.run(task, config, env)?;
        Ok(result.into_output(&task.to_string())?)
    }

    /// Execute `task`, encoding every failure into the returned value.
    fn run_safe(&self, task: &TaskSpec, config: &ExecConfig, env: &EnvChanges) -> SafeResult {
        SafeResult::from_outcome(&task.to_string(), self.run(task, config, env))
    }
}

/// Run `task` natively; a non-zero exit is returned as data.
///
/// # Errors
///
/// See [`TaskRunner::run`].
pub fn execute(
    task: &TaskSpec,
    config: &ExecConfig,
    env: &EnvChanges,
) -> Result<ExecResult, ExecError> {
    NativeExecutor::new().run(task, config, env)
}

/// Run `task` natively and return its stdout; a non-zero exit is an error.
///
/// # Errors
///
/// See [`TaskRunner::run_or_fail`].
pub fn execute_or_fail(
    task: &TaskSpec,
    config: &ExecConfig,
    env: &EnvChanges,
) -> Result<String, ExecError> {
    NativeExecutor::new().run_or_fail(task, config, env)
}

/// Run `task` natively without ever returning an error.
#[must_use]
pub fn execute_safe(task: &TaskSpec, config: &ExecConfig, env: &EnvChanges) -> SafeResult {
    NativeExecutor::new().run_safe(task, config, env)
}
