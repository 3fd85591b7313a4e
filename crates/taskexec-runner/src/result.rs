use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ErrorDescriptor, ExecError, TaskFailure};

// ============================================================================
// ExecResult - outcome of a completed execution
// ============================================================================

/// Outcome of a task that was started and ran to termination.
///
/// - `exit_code` is always present.
/// - `out` is present unless stdout was redirected to a file.
/// - `err` is present only when the exit code is non-zero and stderr was
///   neither merged into stdout nor redirected to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    pub exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl ExecResult {
    #[must_use]
    pub fn new(exit_code: i32, out: Option<String>, err: Option<String>) -> Self {
        Self {
            exit_code,
            out,
            err,
        }
    }

    /// Check if the task exited with code 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Map-shaped view with keys `exit_value`, `out` and `err`; absent
    /// fields have no entry.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::new();
        map.insert("exit_value", self.exit_code.to_string());
        if let Some(ref out) = self.out {
            map.insert("out", out.clone());
        }
        if let Some(ref err) = self.err {
            map.insert("err", err.clone());
        }
        map
    }

    /// Turn a non-zero exit into a [`TaskFailure`] for `task`, otherwise
    /// hand back the captured stdout (empty when it went to a file).
    pub(crate) fn into_output(self, task: &str) -> Result<String, TaskFailure> {
        if self.success() {
            Ok(self.out.unwrap_or_default())
        } else {
            Err(TaskFailure::for_task(
                task,
                self.exit_code,
                self.err.as_deref(),
            ))
        }
    }
}

// ============================================================================
// SafeResult - outcome that never carries an error out
// ============================================================================

/// Result of the exception-swallowing variant.
///
/// `success` is true only when the task exited with code 0. A non-zero exit
/// keeps `exit_code`, `out` and `err` and adds a `task_failure` descriptor.
/// On any engine failure `exit_code` is [`TaskFailure::NO_EXIT_CODE`] and
/// `error` describes what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafeResult {
    pub success: bool,
    pub exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDescriptor>,
}

impl SafeResult {
    #[must_use]
    pub fn failed(error: ErrorDescriptor) -> Self {
        Self {
            success: false,
            exit_code: TaskFailure::NO_EXIT_CODE,
            out: None,
            err: None,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::new();
        map.insert("success", self.success.to_string());
        map.insert("exit_value", self.exit_code.to_string());
        if let Some(ref out) = self.out {
            map.insert("out", out.clone());
        }
        if let Some(ref err) = self.err {
            map.insert("err", err.clone());
        }
        if let Some(ref error) = self.error {
            map.insert("error", error.to_string());
        }
        map
    }

    /// Fold the outcome of running `task` into a [`SafeResult`].
    #[must_use]
    pub fn from_outcome(task: &str, outcome: Result<ExecResult, ExecError>) -> Self {
        match outcome {
            Ok(result) => {
                let error = (!result.success()).then(|| {
                    let failure =
                        TaskFailure::for_task(task, result.exit_code, result.err.as_deref());
                    ErrorDescriptor::from_error(&ExecError::from(failure))
                });
                Self {
                    success: result.success(),
                    exit_code: result.exit_code,
                    out: result.out,
                    err: result.err,
                    error,
                }
            }
            Err(e) => Self::failed(ErrorDescriptor::from_error(&e)),
        }
    }
}
