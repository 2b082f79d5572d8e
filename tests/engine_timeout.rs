// tests/engine_timeout.rs
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, read_pid, sh, wait_until_dead, with_timeout};

use std::time::{Duration, Instant};

use cmdrun::exec::{
    CommandEngine, EXIT_CODE_TIMED_OUT, EngineConfig, ExecutionStatus, Invocation,
};
use cmdrun_test_utils::test_dir;
use tempfile::tempdir;

#[tokio::test]
async fn test_sleep_past_timeout_reports_timeout_sentinel() {
    init_tracing();
    let engine = CommandEngine::default();
    let inv = Invocation::new("sleep", test_dir())
        .arg("10")
        .with_timeout(Duration::from_secs(1));

    let started = Instant::now();
    let result = with_timeout(engine.execute(&inv)).await;

    assert_eq!(result.exit_code, EXIT_CODE_TIMED_OUT);
    assert_eq!(result.status, ExecutionStatus::TimedOut);
    assert!(result.is_timed_out());
    assert!(!result.success());
    assert!(result.error.contains("timed out"), "error: {}", result.error);
    assert!(result.error.contains("1s"), "error: {}", result.error);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_engine_default_timeout_applies_without_override() {
    init_tracing();
    let engine = CommandEngine::new(EngineConfig {
        default_timeout: Duration::from_millis(300),
        ..EngineConfig::default()
    });

    let result = with_timeout(engine.execute(&Invocation::new("sleep", test_dir()).arg("10"))).await;

    assert_eq!(result.exit_code, EXIT_CODE_TIMED_OUT);
    assert!(result.error.contains("300ms"), "error: {}", result.error);
}

#[tokio::test]
async fn test_timed_out_child_is_terminated() {
    init_tracing();
    let dir = tempdir().unwrap();
    let engine = CommandEngine::default();
    let inv = sh("echo $$ > child.pid; exec sleep 30", dir.path())
        .with_timeout(Duration::from_millis(500));

    let result = with_timeout(engine.execute(&inv)).await;
    assert_eq!(result.exit_code, EXIT_CODE_TIMED_OUT);

    let pid = read_pid(dir.path(), "child.pid");
    assert!(wait_until_dead(pid).await, "child {pid} still running");
}

#[tokio::test]
async fn test_timeout_kills_whole_process_tree() {
    init_tracing();
    let dir = tempdir().unwrap();
    let engine = CommandEngine::default();
    let inv = sh("sleep 30 & echo $! > grandchild.pid; wait", dir.path())
        .with_timeout(Duration::from_millis(500));

    let result = with_timeout(engine.execute(&inv)).await;
    assert_eq!(result.exit_code, EXIT_CODE_TIMED_OUT);

    let pid = read_pid(dir.path(), "grandchild.pid");
    assert!(wait_until_dead(pid).await, "grandchild {pid} survived the timeout");
}

#[tokio::test]
async fn test_partial_output_is_kept_on_timeout() {
    init_tracing();
    let engine = CommandEngine::default();
    let inv = sh("echo started; echo warming >&2; sleep 30", &test_dir())
        .with_timeout(Duration::from_millis(500));

    let result = with_timeout(engine.execute(&inv)).await;

    assert_eq!(result.exit_code, EXIT_CODE_TIMED_OUT);
    assert_eq!(result.output, "started");
    assert!(result.error.starts_with("command timed out after 500ms"));
    assert!(result.error.ends_with("warming"), "error: {}", result.error);
}

#[tokio::test]
async fn test_background_process_holding_pipes_does_not_hang() {
    init_tracing();
    let dir = tempdir().unwrap();
    let engine = CommandEngine::default();
    // `sh` exits at once but leaves a child writing nothing and holding stdout.
    let inv = sh("sleep 30 & echo $! > bg.pid; echo done", dir.path())
        .with_timeout(Duration::from_secs(1));

    let started = Instant::now();
    let result = with_timeout(engine.execute(&inv)).await;

    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.output, "done");
    assert!(started.elapsed() < Duration::from_secs(5));

    let pid = read_pid(dir.path(), "bg.pid");
    assert!(wait_until_dead(pid).await, "leftover {pid} was not cleaned up");
}

#[tokio::test]
async fn test_fast_command_is_unaffected_by_long_timeout() {
    init_tracing();
    let engine = CommandEngine::default();
    let inv = Invocation::new("echo", test_dir())
        .arg("quick")
        .with_timeout(Duration::from_secs(60));

    let started = Instant::now();
    let result = with_timeout(engine.execute(&inv)).await;

    assert_eq!(result.output, "quick");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_background_process_that_released_pipes_is_left_alone() {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    init_tracing();
    let dir = tempdir().unwrap();
    let engine = CommandEngine::default();
    let inv = sh(
        "sleep 30 >/dev/null 2>&1 & echo $! > bg.pid; echo done",
        dir.path(),
    )
    .with_timeout(Duration::from_secs(5));

    let result = with_timeout(engine.execute(&inv)).await;

    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(result.output, "done");

    // Both readers hit EOF, so the group is not signalled after the exit.
    let pid = read_pid(dir.path(), "bg.pid");
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!common::is_dead(pid), "detached process {pid} was killed");

    let _ = kill(Pid::from_raw(pid), Signal::SIGKILL);
}
