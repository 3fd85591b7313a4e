//! Shell script validation through an external linter
//!
//! [`ScriptValidator`] runs a linter (`shellcheck` unless told otherwise)
//! against a script and turns its exit code into a [`ScriptReport`].
//! Validation is only attempted on Unix-like hosts; Windows, macOS and
//! SunOS report [`ValidationError::UnsupportedPlatform`] without running
//! anything.

mod platform;

use std::path::Path;

use serde::Serialize;
use taskexec_runner::{
    EnvChanges, ErrorCategory, ExecConfig, ExecError, ExecResult, NativeExecutor, TaskRunner,
    TaskSpec,
};
use thiserror::Error;
use tracing::{debug, info};

pub use platform::Platform;

/// Linter used when none is configured.
pub const DEFAULT_LINTER: &str = "shellcheck";

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Script validation is not supported on {platform}")]
    UnsupportedPlatform { platform: Platform },

    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl ValidationError {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedPlatform { .. } => ErrorCategory::UnsupportedPlatform,
            Self::Exec(e) => e.category(),
        }
    }
}

/// Linter verdict for one script.
///
/// `err` is only present when the linter exited non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    pub ok: bool,
    pub exit_code: i32,
    pub out: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl From<ExecResult> for ScriptReport {
    fn from(result: ExecResult) -> Self {
        Self {
            ok: result.success(),
            exit_code: result.exit_code,
            out: result.out.unwrap_or_default(),
            err: result.err,
        }
    }
}

/// Validates shell scripts by running a linter through a [`TaskRunner`].
///
/// # Example
///
/// ```rust,no_run
/// use taskexec_validation::ScriptValidator;
///
/// let report = ScriptValidator::new().validate("deploy.sh").unwrap();
/// if !report.ok {
///     eprintln!("{}", report.out);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScriptValidator<R = NativeExecutor> {
    runner: R,
    linter: TaskSpec,
    platform: Platform,
}

impl ScriptValidator<NativeExecutor> {
    /// Validator running `shellcheck` natively on the current platform.
    #[must_use]
    pub fn new() -> Self {
        Self::with_runner(NativeExecutor::new())
    }
}

impl Default for ScriptValidator<NativeExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: TaskRunner> ScriptValidator<R> {
    #[must_use]
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            linter: TaskSpec::new(DEFAULT_LINTER),
            platform: Platform::current(),
        }
    }

    /// Replace the linter command. The script path is appended as the last
    /// argument on every run.
    #[must_use]
    pub fn with_linter(mut self, linter: TaskSpec) -> Self {
        self.linter = linter;
        self
    }

    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    #[must_use]
    pub const fn platform(&self) -> &Platform {
        &self.platform
    }

    #[must_use]
    pub const fn linter(&self) -> &TaskSpec {
        &self.linter
    }

    /// Lint `script` and report the verdict.
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnsupportedPlatform`] on hosts without validation
    /// support, or [`ValidationError::Exec`] if the linter cannot be run.
    /// A script that fails linting is not an error; see [`ScriptReport::ok`].
    pub fn validate(&self, script: impl AsRef<Path>) -> Result<ScriptReport, ValidationError> {
        if !self.platform.supports_validation() {
            return Err(ValidationError::UnsupportedPlatform {
                platform: self.platform.clone(),
            });
        }

        let script = script.as_ref();
        let task = self.linter.clone().arg(script);
        debug!(script = %script.display(), linter = %self.linter, "validating script");

        let result = self
            .runner
            .run(&task, &ExecConfig::default(), &EnvChanges::default())?;
        let report = ScriptReport::from(result);
        info!(script = %script.display(), ok = report.ok, exit_code = report.exit_code, "script validated");
        Ok(report)
    }
}
