// tests/engine_concurrency.rs
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, sh, with_timeout};

use std::time::Duration;

use cmdrun::exec::{CommandEngine, Invocation};
use cmdrun_test_utils::test_dir;
use tempfile::tempdir;

fn emit(tag: &str, n: u32) -> String {
    format!("i=1; while [ $i -le {n} ]; do echo {tag}-$i; echo {tag}-err-$i >&2; i=$((i+1)); done")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_engines_do_not_mix_output() {
    init_tracing();
    let engine_a = CommandEngine::default();
    let engine_b = CommandEngine::default();
    let inv_a = sh(&emit("A", 500), &test_dir());
    let inv_b = sh(&emit("B", 500), &test_dir());

    let (a, b) = with_timeout(async {
        tokio::join!(engine_a.execute(&inv_a), engine_b.execute(&inv_b))
    })
    .await;

    assert!(a.success() && b.success());
    assert_eq!(a.output.lines().count(), 500);
    assert_eq!(b.output.lines().count(), 500);
    assert!(a.output.lines().all(|l| l.starts_with("A-")));
    assert!(a.error.lines().all(|l| l.starts_with("A-err-")));
    assert!(b.output.lines().all(|l| l.starts_with("B-")));
    assert!(b.error.lines().all(|l| l.starts_with("B-err-")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_one_engine_serves_concurrent_calls_with_own_cwd() {
    init_tracing();
    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();
    let engine = CommandEngine::default();
    let inv_a = sh("sleep 0.2; pwd -P", dir_a.path());
    let inv_b = sh("pwd -P", dir_b.path());

    let (a, b) = with_timeout(async { tokio::join!(engine.execute(&inv_a), engine.execute(&inv_b)) }).await;

    assert_eq!(a.output, dir_a.path().canonicalize().unwrap().display().to_string());
    assert_eq!(b.output, dir_b.path().canonicalize().unwrap().display().to_string());
}

#[tokio::test]
async fn test_large_output_on_both_streams_does_not_deadlock() {
    init_tracing();
    let engine = CommandEngine::default();
    // Far beyond a pipe buffer on either stream.
    let inv = sh("seq 1 50000; seq 1 50000 >&2", &test_dir()).with_timeout(Duration::from_secs(30));

    let result = with_timeout(engine.execute(&inv)).await;

    assert!(result.success(), "error: {}", result.error);
    assert_eq!(result.output.lines().count(), 50000);
    assert_eq!(result.error.lines().count(), 50000);
    assert_eq!(result.output.lines().last(), Some("50000"));
    assert_eq!(result.error.lines().next(), Some("1"));
}

#[tokio::test]
async fn test_repeated_invocation_is_idempotent() {
    init_tracing();
    let engine = CommandEngine::default();
    let inv = Invocation::new("echo", test_dir()).arg("same").arg("output");

    let first = with_timeout(engine.execute(&inv)).await;
    let second = with_timeout(engine.execute(&inv)).await;

    assert_eq!(first.exit_code, second.exit_code);
    assert_eq!(first.output, second.output);
    assert_eq!(first.command, second.command);
}
