//! Exit codes for the taskexec CLI
//!
//! A task that ran and exited non-zero passes its own code through. Engine
//! failures map to fixed codes by [`ErrorCategory`].

use taskexec_runner::{ErrorCategory, ExecError};
use taskexec_validation::ValidationError;

/// Process exit code returned by the CLI.
///
/// | Constant | Code | Meaning |
/// |----------|------|---------|
/// | [`SUCCESS`](Self::SUCCESS) | 0 | Task succeeded |
/// | [`INTERNAL`](Self::INTERNAL) | 1 | Internal error |
/// | [`CONFIG`](Self::CONFIG) | 2 | Invalid configuration or CLI arguments |
/// | [`UNSUPPORTED_PLATFORM`](Self::UNSUPPORTED_PLATFORM) | 69 | Operation unavailable on this host |
/// | [`IO`](Self::IO) | 74 | I/O failure while running the task |
/// | [`START_FAILURE`](Self::START_FAILURE) | 127 | Task could not be started |
/// | [`INTERRUPTED`](Self::INTERRUPTED) | 130 | Output draining was interrupted |
///
/// ```rust
/// use taskexec::ExitCode;
///
/// assert_eq!(ExitCode::START_FAILURE.as_i32(), 127);
/// assert_eq!(ExitCode::from_i32(3), ExitCode::from(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);

    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Invalid configuration, configuration file or CLI arguments
    pub const CONFIG: ExitCode = ExitCode(2);

    /// `EX_UNAVAILABLE` from sysexits.h
    pub const UNSUPPORTED_PLATFORM: ExitCode = ExitCode(69);

    /// `EX_IOERR` from sysexits.h
    pub const IO: ExitCode = ExitCode(74);

    /// Same code shells use for "command not found"
    pub const START_FAILURE: ExitCode = ExitCode(127);

    pub const INTERRUPTED: ExitCode = ExitCode(130);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    /// Fixed exit code for an error category.
    ///
    /// Task failures have no fixed code; they map to [`INTERNAL`](Self::INTERNAL)
    /// here and callers holding the failure should pass its code through.
    #[must_use]
    pub const fn for_category(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::Configuration => Self::CONFIG,
            ErrorCategory::Start => Self::START_FAILURE,
            ErrorCategory::Io => Self::IO,
            ErrorCategory::Interrupted => Self::INTERRUPTED,
            ErrorCategory::UnsupportedPlatform => Self::UNSUPPORTED_PLATFORM,
            ErrorCategory::TaskFailure => Self::INTERNAL,
        }
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl From<&ExecError> for ExitCode {
    fn from(err: &ExecError) -> Self {
        match err.exit_code() {
            // A failure without a real exit code still has to be non-zero
            Some(code) if code > 0 => ExitCode(code),
            Some(_) => Self::INTERNAL,
            None => Self::for_category(err.category()),
        }
    }
}

impl From<&ValidationError> for ExitCode {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::Exec(e) => Self::from(e),
            ValidationError::UnsupportedPlatform { .. } => Self::UNSUPPORTED_PLATFORM,
        }
    }
}
