// tests/blocking.rs
#![cfg(unix)]

use std::time::Duration;

use cmdrun::exec::{
    CommandEngine, EXIT_CODE_LAUNCH_FAILURE, EXIT_CODE_TIMED_OUT, ExecutionStatus, Invocation,
};
use cmdrun_test_utils::{init_tracing, test_dir};

#[test]
fn test_blocking_echo_matches_async_contract() {
    init_tracing();
    let engine = CommandEngine::default();
    let inv = Invocation::new("echo", test_dir())
        .arg("hello")
        .with_timeout(Duration::from_secs(5));

    let result = engine.execute_blocking(&inv);

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.output, "hello");
    assert_eq!(result.error, "");
    assert!(result.success());
}

#[test]
fn test_blocking_timeout_returns_sentinel() {
    init_tracing();
    let engine = CommandEngine::default();
    let inv = Invocation::new("sleep", test_dir())
        .arg("10")
        .with_timeout(Duration::from_millis(300));

    let result = engine.execute_blocking(&inv);

    assert_eq!(result.exit_code, EXIT_CODE_TIMED_OUT);
    assert!(result.error.contains("timed out"));
}

#[tokio::test]
async fn test_blocking_inside_current_thread_runtime_runs_command() {
    init_tracing();
    let engine = CommandEngine::default();
    let inv = Invocation::new("echo", test_dir())
        .arg("hi")
        .with_timeout(Duration::from_secs(5));

    let result = engine.execute_blocking(&inv);

    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.output, "hi");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_blocking_inside_multi_thread_runtime_still_times_out() {
    init_tracing();
    let engine = CommandEngine::default();
    let inv = Invocation::new("sleep", test_dir())
        .arg("10")
        .with_timeout(Duration::from_millis(300));

    let result = engine.execute_blocking(&inv);

    assert_eq!(result.status, ExecutionStatus::TimedOut);
    assert_eq!(result.exit_code, EXIT_CODE_TIMED_OUT);
}

#[tokio::test]
async fn test_blocking_inside_runtime_reports_launch_failure() {
    init_tracing();
    let engine = CommandEngine::default();
    let inv = Invocation::new("definitely-not-a-real-program-cmdrun", test_dir());

    let result = engine.execute_blocking(&inv);

    assert_eq!(result.status, ExecutionStatus::LaunchFailed);
    assert_eq!(result.exit_code, EXIT_CODE_LAUNCH_FAILURE);
}
