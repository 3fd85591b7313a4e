//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Initializes logging
//! - Loads the configuration file and merges CLI overrides
//! - Dispatches to the subcommand
//! - Handles all error output

use clap::Parser;
use serde::Serialize;

use super::args::{Cli, Commands, ExecArgs};
use crate::config::{FileConfig, resolve};
use crate::logging::init_tracing;
use crate::{
    EnvChanges, ExecConfig, ExecError, ExitCode, ScriptValidator, TaskSpec, execute,
    execute_or_fail, execute_safe,
};

/// Main CLI execution function.
///
/// This function handles ALL output including errors. It returns `Result<(), ExitCode>`:
/// - On success: returns `Ok(())` after printing any output
/// - On error: prints the error, returns `Err(ExitCode)`
///
/// main.rs only calls `std::process::exit(code.as_i32())` on error - it does NOT print.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let file = match &cli.config {
        Some(path) => FileConfig::load(path).map_err(|e| {
            eprintln!("Error: {e:#}");
            ExitCode::CONFIG
        })?,
        None => FileConfig::default(),
    };

    match cli.command {
        Commands::Run { exec } => run_task(&file, &exec),
        Commands::Strict { exec } => run_strict(&file, &exec),
        Commands::Safe { exec } => run_safe(&file, &exec),
        Commands::Validate {
            script,
            linter,
            linter_args,
            json,
        } => {
            let mut validator = ScriptValidator::new();
            if linter.is_some() || !linter_args.is_empty() {
                let program =
                    linter.unwrap_or_else(|| taskexec_validation::DEFAULT_LINTER.to_string());
                validator = validator.with_linter(TaskSpec::new(program).args(linter_args));
            }
            match validator.validate(&script) {
                Ok(report) => {
                    if json {
                        print_json(&report)?;
                    } else {
                        print_captured(Some(&report.out), report.err.as_deref());
                    }
                    if report.ok {
                        Ok(())
                    } else {
                        Err(task_exit_code(report.exit_code))
                    }
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    Err(ExitCode::from(&e))
                }
            }
        }
    }
}

fn prepare(
    file: &FileConfig,
    exec: &ExecArgs,
) -> Result<(TaskSpec, ExecConfig, EnvChanges), ExitCode> {
    let task = TaskSpec::from_argv(&exec.task).map_err(|e| report(&ExecError::from(e)))?;
    let (config, env) =
        resolve(file, &exec.overrides()).map_err(|e| report(&ExecError::from(e)))?;
    Ok((task, config, env))
}

fn run_task(file: &FileConfig, exec: &ExecArgs) -> Result<(), ExitCode> {
    let (task, config, env) = prepare(file, exec)?;
    let result = execute(&task, &config, &env).map_err(|e| report(&e))?;

    if exec.json {
        print_json(&result)?;
    } else {
        print_captured(result.out.as_deref(), result.err.as_deref());
    }

    if result.success() {
        Ok(())
    } else {
        Err(task_exit_code(result.exit_code))
    }
}

fn run_strict(file: &FileConfig, exec: &ExecArgs) -> Result<(), ExitCode> {
    let (task, config, env) = prepare(file, exec)?;
    let out = execute_or_fail(&task, &config, &env).map_err(|e| report(&e))?;

    if exec.json {
        print_json(&serde_json::json!({ "out": out }))?;
    } else if !out.is_empty() {
        println!("{out}");
    }
    Ok(())
}

/// Always exits 0 once the result is printed; the outcome is in the JSON.
fn run_safe(file: &FileConfig, exec: &ExecArgs) -> Result<(), ExitCode> {
    let (task, config, env) = prepare(file, exec)?;
    let result = execute_safe(&task, &config, &env);
    print_json(&result)
}

fn report(err: &ExecError) -> ExitCode {
    match err {
        ExecError::TaskFailed(failure) => {
            eprintln!("{}", failure.message());
            task_exit_code(failure.exit_code())
        }
        other => {
            eprintln!("Error: {other}");
            ExitCode::from(other)
        }
    }
}

/// Exit code for a task that ran and failed. Missing codes, and codes the
/// OS would wrap to 0, become [`ExitCode::INTERNAL`].
fn task_exit_code(code: i32) -> ExitCode {
    if code <= 0 || code & 0xff == 0 {
        ExitCode::INTERNAL
    } else {
        ExitCode::from_i32(code)
    }
}

fn print_captured(out: Option<&str>, err: Option<&str>) {
    if let Some(out) = out.filter(|s| !s.is_empty()) {
        println!("{out}");
    }
    if let Some(err) = err.filter(|s| !s.is_empty()) {
        eprintln!("{err}");
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ExitCode> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        eprintln!("Error: failed to serialize result: {e}");
        ExitCode::INTERNAL
    })?;
    println!("{json}");
    Ok(())
}
