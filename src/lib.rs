// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::exec::{ArgList, CommandEngine, CommandRunner, ExecutionResult, Invocation};
use crate::types::{ExecutionStatus, format_duration};

/// Exit code of the binary when the program timed out (as `timeout(1)`).
pub const EXIT_TIMED_OUT: i32 = 124;

/// Exit code of the binary when cmdrun itself failed (bad config, bad flags).
pub const EXIT_TOOL_FAILURE: i32 = 125;

/// Exit code of the binary when the program could not be started.
pub const EXIT_LAUNCH_FAILED: i32 = 127;

/// High-level entry point used by `main.rs`.
///
/// Loads config, builds the invocation from the CLI, runs it on a fresh
/// engine and returns the exit code the binary should exit with.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_or_default(args.config.as_deref()).context("loading config")?;
    let invocation = build_invocation(&args)?;

    if args.dry_run {
        print_dry_run(&cfg, &invocation);
        return Ok(0);
    }

    let engine = CommandEngine::new(cfg.engine_config());
    Ok(run_with(&engine, &invocation).await)
}

/// Run `invocation` on `runner`, forward its captured streams, and map the
/// result onto a process exit code.
pub async fn run_with<R>(runner: &R, invocation: &Invocation) -> i32
where
    R: CommandRunner + ?Sized,
{
    let result = runner.run(invocation).await;

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    if !result.error.is_empty() {
        eprintln!("{}", result.error);
    }

    let code = process_exit_code(&result);
    debug!(
        status = %result.status,
        exit_code = result.exit_code,
        process_exit = code,
        "run finished"
    );
    code
}

/// Map an execution result onto an exit code usable by a process.
///
/// - completed with a code in 0–255: that code
/// - completed with any other code: 1
/// - timed out: [`EXIT_TIMED_OUT`]
/// - launch failure: [`EXIT_LAUNCH_FAILED`]
pub fn process_exit_code(result: &ExecutionResult) -> i32 {
    match result.status {
        ExecutionStatus::Completed if (0..=255).contains(&result.exit_code) => result.exit_code,
        ExecutionStatus::Completed => 1,
        ExecutionStatus::TimedOut => EXIT_TIMED_OUT,
        ExecutionStatus::LaunchFailed => EXIT_LAUNCH_FAILED,
    }
}

/// Build the invocation described by the CLI arguments.
pub fn build_invocation(args: &CliArgs) -> Result<Invocation> {
    let cwd = match &args.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("resolving current directory")?,
    };

    let mut arg_list: ArgList = args.args.iter().cloned().collect();
    if let Some(joined) = &args.args_string {
        arg_list.extend(ArgList::parse(joined).context("parsing --args-string")?);
    }

    let mut invocation = Invocation::new(&args.program, cwd).with_args(arg_list);
    if let Some(timeout) = args.timeout {
        invocation = invocation.with_timeout(timeout.as_duration());
    }
    for (key, value) in &args.env {
        invocation = invocation.env(key, value);
    }

    Ok(invocation)
}

/// Simple dry-run output: print the resolved invocation and engine settings.
fn print_dry_run(cfg: &ConfigFile, invocation: &Invocation) {
    let engine = cfg.engine_config();
    let timeout = invocation.timeout().unwrap_or(engine.default_timeout);

    println!("cmdrun dry-run");
    println!("  command: {}", invocation.command_line());
    println!("  cwd: {}", invocation.working_dir().display());
    println!("  timeout: {}", format_duration(timeout));
    println!("  kill_grace: {}", format_duration(engine.kill_grace));
    println!("  kill_process_tree: {}", engine.kill_process_tree);

    let mut env = engine.env;
    env.extend(
        invocation
            .env_overrides()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    if !env.is_empty() {
        println!("  env:");
        for (key, value) in &env {
            println!("    {key}={value}");
        }
    }

    debug!("dry-run complete (no execution)");
}
