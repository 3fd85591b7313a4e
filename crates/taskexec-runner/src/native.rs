use std::fs::File;
use std::io::{self, PipeReader};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use tracing::{debug, info, info_span, warn};

use crate::config::{ErrorTarget, ExecConfig, FileRedirect, OutputTarget};
use crate::drain::spawn_drain;
use crate::env::EnvChanges;
use crate::error::{ExecError, TaskFailure};
use crate::result::ExecResult;
use crate::runner::TaskRunner;
use crate::task::TaskSpec;

type DrainHandle = JoinHandle<io::Result<String>>;

// ============================================================================
// NativeExecutor - process execution with concurrent draining
// ============================================================================

/// Runs tasks as native child processes using `std::process::Command`.
///
/// Each call owns its child, pipes and drain threads; nothing is shared
/// between calls, so one executor may be used from many threads at once.
///
/// # Ordering
///
/// Captured pipes are drained on their own threads. Those threads are joined
/// before the child is waited on, and the exit code is only read after both
/// have finished. Reading to end-of-stream first means a child can never
/// block on a full pipe while the caller waits for it to exit.
///
/// # Example
///
/// ```rust,no_run
/// use taskexec_runner::{EnvChanges, ExecConfig, NativeExecutor, TaskRunner, TaskSpec};
///
/// let runner = NativeExecutor::new();
/// let task = TaskSpec::new("echo").arg("hello world");
///
/// let result = runner
///     .run(&task, &ExecConfig::default(), &EnvChanges::default())
///     .unwrap();
/// assert_eq!(result.exit_code, 0);
/// assert_eq!(result.out.as_deref(), Some("hello world"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeExecutor;

impl NativeExecutor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TaskRunner for NativeExecutor {
    fn run(
        &self,
        task: &TaskSpec,
        config: &ExecConfig,
        env: &EnvChanges,
    ) -> Result<ExecResult, ExecError> {
        task.validate()?;

        let label = task.to_string();
        let span = info_span!("execute", task = %label);
        let _entered = span.enter();

        let mut command = task.to_command();
        command.stdin(Stdio::null());
        if let Some(dir) = config.directory() {
            command.current_dir(dir);
        }
        let merged = configure_streams(&mut command, config, &label)?;
        env.apply(&mut command);

        debug!(directory = ?config.directory(), "starting task process");
        let spawned = command.spawn();
        // The command holds the parent's copies of redirect files and the
        // merged pipe's write ends; they must close for the drain to see EOF.
        drop(command);
        let mut child = spawned.map_err(|source| ExecError::Spawn {
            task: label.clone(),
            source,
        })?;

        let (stdout_worker, stderr_worker) = match start_workers(&mut child, merged) {
            Ok(workers) => workers,
            Err(source) => {
                abandon(&mut child);
                return Err(ExecError::Io {
                    task: label,
                    context: "starting drain workers".to_string(),
                    source,
                });
            }
        };

        let mut failure = None;
        let out_text = join_worker(stdout_worker, "stdout", &label, &mut failure);
        let err_text = join_worker(stderr_worker, "stderr", &label, &mut failure);
        let waited = child.wait();

        if let Some(e) = failure {
            return Err(e);
        }
        let status = waited.map_err(|source| ExecError::Io {
            task: label.clone(),
            context: "waiting for exit".to_string(),
            source,
        })?;

        let exit_code = exit_code(status);
        info!(exit_code, success = (exit_code == 0), "task process exited");

        let finish = |text: String| {
            if config.trim {
                text.trim().to_string()
            } else {
                text
            }
        };
        let out = matches!(config.stdout, OutputTarget::Capture).then(|| finish(out_text));
        let err = (exit_code != 0 && matches!(config.stderr, ErrorTarget::Capture))
            .then(|| finish(err_text));

        Ok(ExecResult::new(exit_code, out, err))
    }
}

/// Point the child's stdout and stderr at their configured destinations.
///
/// Returns the read end of the shared pipe when stderr is merged into a
/// captured stdout.
fn configure_streams(
    command: &mut Command,
    config: &ExecConfig,
    label: &str,
) -> Result<Option<PipeReader>, ExecError> {
    let merge = matches!(config.stderr, ErrorTarget::MergeIntoStdout);
    let pipe_error = |source| ExecError::Io {
        task: label.to_string(),
        context: "creating merged output pipe".to_string(),
        source,
    };

    let merged = match &config.stdout {
        OutputTarget::Capture if merge => {
            let (reader, writer) = io::pipe().map_err(pipe_error)?;
            let err_writer = writer.try_clone().map_err(pipe_error)?;
            command.stdout(writer).stderr(err_writer);
            Some(reader)
        }
        OutputTarget::Capture => {
            command.stdout(Stdio::piped());
            None
        }
        OutputTarget::File(redirect) => {
            let file = open_redirect(redirect)?;
            if merge {
                let err_file = file.try_clone().map_err(|source| ExecError::Redirect {
                    path: redirect.path.clone(),
                    source,
                })?;
                command.stderr(err_file);
            }
            command.stdout(file);
            None
        }
    };

    match &config.stderr {
        ErrorTarget::Capture => {
            command.stderr(Stdio::piped());
        }
        ErrorTarget::File(redirect) => {
            command.stderr(open_redirect(redirect)?);
        }
        ErrorTarget::MergeIntoStdout => {}
    }

    Ok(merged)
}

fn open_redirect(redirect: &FileRedirect) -> Result<File, ExecError> {
    debug!(path = %redirect.path.display(), mode = redirect.mode.as_str(), "redirecting stream to file");
    redirect.open().map_err(|source| ExecError::Redirect {
        path: redirect.path.clone(),
        source,
    })
}

fn start_workers(
    child: &mut Child,
    merged: Option<PipeReader>,
) -> io::Result<(Option<DrainHandle>, Option<DrainHandle>)> {
    let stdout_worker = match merged {
        Some(reader) => Some(spawn_drain("stdout", reader)?),
        None => child
            .stdout
            .take()
            .map(|pipe| spawn_drain("stdout", pipe))
            .transpose()?,
    };
    let stderr_worker = child
        .stderr
        .take()
        .map(|pipe| spawn_drain("stderr", pipe))
        .transpose()?;
    Ok((stdout_worker, stderr_worker))
}

/// Join a drain worker, recording the first failure seen across workers.
///
/// Later workers are still joined after a failure so the child is never left
/// writing into an abandoned pipe.
fn join_worker(
    worker: Option<DrainHandle>,
    stream: &'static str,
    label: &str,
    failure: &mut Option<ExecError>,
) -> String {
    let Some(handle) = worker else {
        return String::new();
    };
    let error = match handle.join() {
        Ok(Ok(text)) => return text,
        Ok(Err(source)) => ExecError::Io {
            task: label.to_string(),
            context: format!("reading {stream}"),
            source,
        },
        Err(_) => {
            warn!(stream, "drain worker panicked");
            ExecError::Interrupted {
                task: label.to_string(),
                stream,
            }
        }
    };
    if failure.is_none() {
        *failure = Some(error);
    }
    String::new()
}

fn abandon(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!(error = %e, "failed to kill child after worker start failure");
    }
    if let Err(e) = child.wait() {
        warn!(error = %e, "failed to reap child after worker start failure");
    }
}

/// Exit code of a finished child. On Unix a signal-terminated child reports
/// `128 + signal`, as shells do.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    TaskFailure::NO_EXIT_CODE
}
