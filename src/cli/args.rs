//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and the subcommand enum.

use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::Overrides;

/// taskexec - run external commands with captured output
#[derive(Parser, Debug)]
#[command(name = "taskexec")]
#[command(about = "Run external commands with concurrent output capture, redirection and environment control")]
#[command(long_about = r#"
taskexec starts an external command, drains its stdout and stderr
concurrently, applies redirection and environment changes, and reports
the exit code and captured output.

EXAMPLES:
  # Print captured output and exit with the task's code
  taskexec run -- git status --short

  # Fail on non-zero exit with the captured stderr
  taskexec strict --dir ./app -- npm test

  # Append stdout and stderr to one log file
  taskexec run --out build.log --out-mode append --merge-stderr -- make

  # Never fail; print the outcome as JSON
  taskexec safe --env LC_ALL=C --unset HTTP_PROXY -- ./probe.sh

  # Lint a shell script
  taskexec validate deploy.sh

CONFIGURATION:
  Options are resolved with precedence: CLI flags > config file > defaults
  Use --config to load options from a TOML file
"#)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a task; a non-zero exit is reported, not treated as an error
    Run {
        #[command(flatten)]
        exec: ExecArgs,
    },

    /// Run a task and fail with its stderr when it exits non-zero
    Strict {
        #[command(flatten)]
        exec: ExecArgs,
    },

    /// Run a task and print the outcome as JSON, never failing
    Safe {
        #[command(flatten)]
        exec: ExecArgs,
    },

    /// Lint a shell script (Unix-like hosts only)
    Validate {
        /// Script to validate
        script: PathBuf,

        /// Linter program to use instead of shellcheck
        #[arg(long, value_name = "PROGRAM")]
        linter: Option<String>,

        /// Extra argument for the linter, placed before the script (repeatable)
        #[arg(long = "linter-arg", value_name = "ARG", allow_hyphen_values = true)]
        linter_args: Vec<String>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Options shared by the task-running subcommands.
#[derive(Args, Debug, Clone)]
pub struct ExecArgs {
    /// Keep leading and trailing whitespace in captured output
    #[arg(long)]
    pub no_trim: bool,

    /// Working directory for the task
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Redirect stdout to a file (requires --out-mode)
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// How --out treats an existing file: overwrite or append
    #[arg(long, value_name = "MODE")]
    pub out_mode: Option<String>,

    /// Redirect stderr to a file (requires --err-mode)
    #[arg(long, value_name = "FILE")]
    pub err: Option<PathBuf>,

    /// How --err treats an existing file: overwrite or append
    #[arg(long, value_name = "MODE")]
    pub err_mode: Option<String>,

    /// Merge stderr into stdout
    #[arg(long)]
    pub merge_stderr: bool,

    /// Set an environment variable for the task (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,

    /// Remove an environment variable for the task (repeatable)
    #[arg(long = "unset", value_name = "KEY")]
    pub unset: Vec<String>,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,

    /// The task: executable followed by its arguments, after `--`
    #[arg(required = true, last = true, value_name = "TASK")]
    pub task: Vec<OsString>,
}

impl ExecArgs {
    /// Command-line options in the form the configuration merge expects.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            trim: self.no_trim.then_some(false),
            directory: self.dir.clone(),
            out_path: self.out.clone(),
            out_mode: self.out_mode.clone(),
            err_path: self.err.clone(),
            err_mode: self.err_mode.clone(),
            merge_stderr: self.merge_stderr.then_some(true),
            env: self.env.clone(),
            unset: self.unset.clone(),
        }
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}
