//! End-to-end tests for task execution against real child processes.
//!
//! Tests cover:
//! - Exit code and captured output for succeeding and failing tasks
//! - The failing and the error-swallowing entry points
//! - Trimming, redirection to files and stderr merging
//! - Environment changes and the working directory
//! - Large output on both streams without deadlock

#![cfg(unix)]

use std::fs;

use taskexec_runner::{
    ConfigError, EnvChanges, ErrorCategory, ExecConfig, ExecError, RedirectMode, TaskSpec,
    execute, execute_or_fail, execute_safe,
};
use tempfile::TempDir;

fn sh(script: &str) -> TaskSpec {
    TaskSpec::new("sh").arg("-c").arg(script)
}

fn no_env() -> EnvChanges {
    EnvChanges::new()
}

// ============================================================================
// Result shapes
// ============================================================================

#[test]
fn test_zero_exit_returns_trimmed_stdout() {
    let result = execute(&sh("echo '  hello  '"), &ExecConfig::default(), &no_env()).unwrap();
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.out.as_deref(), Some("hello"));
    assert_eq!(result.err, None);
}

#[test]
fn test_non_zero_exit_returns_code_and_stderr() {
    let result = execute(
        &sh("echo partial; echo 'something broke' >&2; exit 5"),
        &ExecConfig::default(),
        &no_env(),
    )
    .unwrap();
    assert_eq!(result.exit_code, 5);
    assert_eq!(result.out.as_deref(), Some("partial"));
    assert_eq!(result.err.as_deref(), Some("something broke"));
}

#[test]
fn test_execute_or_fail_returns_stdout() {
    let out = execute_or_fail(
        &TaskSpec::new("echo").args(["a", "b"]),
        &ExecConfig::default(),
        &no_env(),
    )
    .unwrap();
    assert_eq!(out, "a b");
}

#[test]
fn test_execute_or_fail_carries_exit_code_and_stderr() {
    let err = execute_or_fail(
        &sh("echo 'no such thing' >&2; exit 3"),
        &ExecConfig::default(),
        &no_env(),
    )
    .unwrap_err();

    let ExecError::TaskFailed(failure) = err else {
        panic!("expected task failure, got {err:?}");
    };
    assert_eq!(failure.exit_code(), 3);
    assert!(failure.message().contains("exit value 3"), "{}", failure.message());
    assert!(failure.message().contains("no such thing"), "{}", failure.message());
}

#[test]
fn test_execute_or_fail_rejects_merge() {
    let config = ExecConfig::builder()
        .redirect_err_to_stdout(true)
        .build()
        .unwrap();
    let err = execute_or_fail(&TaskSpec::new("true"), &config, &no_env()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn test_execute_safe_reports_task_failure_as_data() {
    let safe = execute_safe(
        &sh("echo broken >&2; exit 9"),
        &ExecConfig::default(),
        &no_env(),
    );
    assert!(!safe.success);
    assert_eq!(safe.exit_code, 9);
    assert_eq!(safe.err.as_deref(), Some("broken"));
    let error = safe.error.unwrap();
    assert_eq!(error.category, ErrorCategory::TaskFailure);
    assert!(error.message.contains("exit value 9"));
    assert!(error.message.ends_with("broken"));
}

#[test]
fn test_execute_safe_never_errors() {
    let missing = TaskSpec::new("taskexec_no_such_program_for_tests");
    assert!(execute(&missing, &ExecConfig::default(), &no_env()).is_err());

    let safe = execute_safe(&missing, &ExecConfig::default(), &no_env());
    assert!(!safe.success);
    assert_eq!(safe.exit_code, -1);
    let error = safe.error.unwrap();
    assert_eq!(error.category, ErrorCategory::Start);
    assert!(error.message.contains("taskexec_no_such_program_for_tests"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_trim_false_preserves_whitespace() {
    let config = ExecConfig::builder().trim(false).build().unwrap();
    let result = execute(&sh("printf '  hi  '"), &config, &no_env()).unwrap();
    assert_eq!(result.out.as_deref(), Some("  hi  \n"));

    let result = execute(&sh("printf '  e  ' >&2; exit 1"), &config, &no_env()).unwrap();
    assert_eq!(result.exit_code, 1);
    assert_eq!(result.err.as_deref(), Some("  e  \n"));
}

#[test]
fn test_redirect_pair_must_be_complete() {
    let err = ExecConfig::from_options([("redirect_out_path", "out.txt")]).unwrap_err();
    assert!(matches!(err, ConfigError::MissingRedirectMode { .. }));

    let err = ExecConfig::from_options([("redirect_err_mode", "append")]).unwrap_err();
    assert!(matches!(err, ConfigError::MissingRedirectPath { .. }));
}

#[test]
fn test_merge_conflicts_with_error_file() {
    let err = ExecConfig::from_options([
        ("redirect_err_to_stdout", "true"),
        ("redirect_err_path", "err.txt"),
        ("redirect_err_mode", "overwrite"),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::ConflictingErrorTargets));
}

#[test]
fn test_invalid_task_is_config_error_not_failure() {
    let safe = execute_safe(
        &TaskSpec::new("echo").arg("nul\0inside"),
        &ExecConfig::default(),
        &no_env(),
    );
    assert!(!safe.success);
    assert_eq!(safe.error.unwrap().category, ErrorCategory::Configuration);
}

// ============================================================================
// Redirection
// ============================================================================

fn out_file_config(path: &std::path::Path, mode: RedirectMode) -> ExecConfig {
    ExecConfig::builder()
        .redirect_out_path(path)
        .redirect_out_mode(mode)
        .build()
        .unwrap()
}

#[test]
fn test_append_extends_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.txt");
    let config = out_file_config(&path, RedirectMode::Append);

    execute(&sh("printf A"), &config, &no_env()).unwrap();
    let result = execute(&sh("printf B"), &config, &no_env()).unwrap();

    assert_eq!(result.out, None);
    assert_eq!(fs::read_to_string(&path).unwrap(), "AB");
}

#[test]
fn test_overwrite_truncates_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.txt");
    let config = out_file_config(&path, RedirectMode::Overwrite);

    execute(&sh("printf AAAA"), &config, &no_env()).unwrap();
    execute(&sh("printf B"), &config, &no_env()).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "B");
}

#[test]
fn test_execute_or_fail_with_stdout_file_returns_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.txt");
    let config = out_file_config(&path, RedirectMode::Overwrite);

    let out = execute_or_fail(&sh("echo to-file"), &config, &no_env()).unwrap();
    assert_eq!(out, "");
    assert_eq!(fs::read_to_string(&path).unwrap(), "to-file\n");
}

#[test]
fn test_stderr_file_redirect_omits_err() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("err.txt");
    let config = ExecConfig::builder()
        .redirect_err_path(&path)
        .redirect_err_mode(RedirectMode::Overwrite)
        .build()
        .unwrap();

    let result = execute(&sh("echo oops >&2; exit 2"), &config, &no_env()).unwrap();
    assert_eq!(result.exit_code, 2);
    assert_eq!(result.err, None);
    assert_eq!(fs::read_to_string(&path).unwrap(), "oops\n");
}

#[test]
fn test_merge_with_stdout_file_writes_both_streams() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("all.txt");
    let config = ExecConfig::builder()
        .redirect_out_path(&path)
        .redirect_out_mode(RedirectMode::Overwrite)
        .redirect_err_to_stdout(true)
        .build()
        .unwrap();

    let result = execute(&sh("echo first; echo second >&2; exit 1"), &config, &no_env()).unwrap();
    assert_eq!(result.exit_code, 1);
    assert_eq!(result.out, None);
    assert_eq!(result.err, None);
    assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
}

#[test]
fn test_merge_into_captured_stdout() {
    let config = ExecConfig::builder()
        .redirect_err_to_stdout(true)
        .build()
        .unwrap();
    let result = execute(&sh("echo out; echo err >&2; exit 4"), &config, &no_env()).unwrap();
    assert_eq!(result.exit_code, 4);
    assert_eq!(result.out.as_deref(), Some("out\nerr"));
    assert_eq!(result.err, None);
}

// ============================================================================
// Environment and working directory
// ============================================================================

#[test]
fn test_env_addition_is_visible() {
    let env = EnvChanges::new().set("TASKEXEC_GREETING", "hi there");
    let result = execute(&sh("echo \"$TASKEXEC_GREETING\""), &ExecConfig::default(), &env).unwrap();
    assert_eq!(result.out.as_deref(), Some("hi there"));
}

#[test]
fn test_env_removal_wins_over_addition() {
    let env = EnvChanges::new()
        .set("TASKEXEC_BOTH", "added")
        .unset("TASKEXEC_BOTH");
    let result = execute(&sh("echo \"${TASKEXEC_BOTH-unset}\""), &ExecConfig::default(), &env)
        .unwrap();
    assert_eq!(result.out.as_deref(), Some("unset"));
}

#[test]
fn test_env_removal_of_inherited_variable() {
    let env = EnvChanges::new().unset("HOME");
    let result = execute(&sh("echo \"${HOME-unset}\""), &ExecConfig::default(), &env).unwrap();
    assert_eq!(result.out.as_deref(), Some("unset"));
}

#[test]
fn test_directory_sets_child_cwd() {
    let dir = TempDir::new().unwrap();
    let config = ExecConfig::builder().directory(dir.path()).build().unwrap();
    let result = execute(&TaskSpec::new("pwd").arg("-P"), &config, &no_env()).unwrap();

    let expected = fs::canonicalize(dir.path()).unwrap();
    assert_eq!(result.out.as_deref(), expected.to_str());
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_large_output_on_both_streams_does_not_deadlock() {
    let script = "i=0; while [ $i -lt 20000 ]; do echo \"out line $i\"; echo \"err line $i\" >&2; i=$((i+1)); done; exit 3";
    let result = execute(&sh(script), &ExecConfig::default(), &no_env()).unwrap();

    assert_eq!(result.exit_code, 3);
    let out = result.out.unwrap();
    let err = result.err.unwrap();
    assert_eq!(out.lines().count(), 20000);
    assert_eq!(err.lines().count(), 20000);
    assert!(out.ends_with("out line 19999"));
    assert!(err.ends_with("err line 19999"));
}

#[test]
fn test_concurrent_calls_are_independent() {
    let handles: Vec<_> = (0..8)
        .map(|n| {
            std::thread::spawn(move || {
                let task = sh(&format!("echo task-{n}; exit {n}"));
                execute(&task, &ExecConfig::default(), &EnvChanges::new()).unwrap()
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let result = handle.join().unwrap();
        assert_eq!(result.exit_code, n as i32);
        assert_eq!(result.out, Some(format!("task-{n}")));
    }
}
