use std::ffi::{OsStr, OsString};
use std::fmt;
use std::process::Command;

use crate::error::ConfigError;

// ============================================================================
// TaskSpec - argv-style task description
// ============================================================================

/// The external command to run: element 0 is the executable, the rest are
/// its arguments.
///
/// Arguments are stored as discrete `OsString` elements and handed to the OS
/// argv-style. Nothing is ever passed through a shell, so metacharacters in
/// arguments reach the child verbatim.
///
/// # Example
///
/// ```rust
/// use taskexec_runner::TaskSpec;
/// use std::ffi::OsString;
///
/// let task = TaskSpec::new("git").arg("status").arg("--short");
///
/// assert_eq!(task.program, OsString::from("git"));
/// assert_eq!(task.args.len(), 2);
/// assert_eq!(task.to_string(), "[git,status,--short]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    /// The program to execute
    pub program: OsString,
    /// Arguments as discrete elements (NOT shell strings)
    pub args: Vec<OsString>,
}

impl TaskSpec {
    /// Create a task that runs `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Build a task from a full argv sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyTask`] when the sequence has no elements.
    ///
    /// ```rust
    /// use taskexec_runner::TaskSpec;
    ///
    /// let task = TaskSpec::from_argv(["echo", "hello"]).unwrap();
    /// assert_eq!(task.args.len(), 1);
    ///
    /// assert!(TaskSpec::from_argv(Vec::<String>::new()).is_err());
    /// ```
    pub fn from_argv<I, S>(argv: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut iter = argv.into_iter().map(Into::into);
        let program = iter.next().ok_or(ConfigError::EmptyTask)?;
        Ok(Self {
            program,
            args: iter.collect(),
        })
    }

    /// Add a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Iterate over every element of the task, program first.
    pub fn argv(&self) -> impl Iterator<Item = &OsStr> {
        std::iter::once(self.program.as_os_str()).chain(self.args.iter().map(OsString::as_os_str))
    }

    /// Check the task before launch.
    ///
    /// An element containing a NUL byte can never be passed to the OS, so it
    /// is rejected here instead of surfacing as a start failure.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyProgram`] or [`ConfigError::NulInTask`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program.is_empty() {
            return Err(ConfigError::EmptyProgram);
        }
        if let Some(index) = self
            .argv()
            .position(|element| element.to_string_lossy().contains('\0'))
        {
            return Err(ConfigError::NulInTask { index });
        }
        Ok(())
    }

    /// Convert into a `std::process::Command` carrying only program and args.
    ///
    /// Working directory, stdio and environment are applied by the executor.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, element) in self.argv().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", element.to_string_lossy())?;
        }
        f.write_str("]")
    }
}
