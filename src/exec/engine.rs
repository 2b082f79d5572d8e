// src/exec/engine.rs

//! The command execution engine.
//!
//! One call to [`CommandEngine::execute`] walks a single invocation through
//! `Launching → Running → {Completed | TimedOut | LaunchFailed}` and always
//! ends with an [`ExecutionResult`]. Failures never escape as errors.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::errors::CmdrunError;
use crate::exec::collector::StreamCollector;
use crate::exec::invocation::Invocation;
use crate::exec::launcher::{self, LaunchedProcess};
use crate::exec::result::{ExecutionResult, exit_code_of};
use crate::exec::supervisor::{Supervision, supervise};
use crate::types::format_duration;

/// Timeout applied when an invocation does not set its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// How long to keep draining output after a kill, and the minimum drain
/// window after a normal exit.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_millis(500);

/// Engine-wide settings. Immutable once the engine is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub default_timeout: Duration,
    pub kill_grace: Duration,
    /// Start each child in its own process group and kill the whole group
    /// on timeout (Unix only).
    pub kill_process_tree: bool,
    /// Extra environment for every child; invocation overrides win.
    pub env: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            kill_grace: DEFAULT_KILL_GRACE,
            kill_process_tree: true,
            env: BTreeMap::new(),
        }
    }
}

/// Runs invocations as child processes.
///
/// Holds no per-call state, so one engine can serve concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct CommandEngine {
    config: EngineConfig,
}

impl CommandEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one invocation to completion, timeout, or launch failure.
    pub async fn execute(&self, invocation: &Invocation) -> ExecutionResult {
        let command = invocation.command_line();
        let timeout = invocation.timeout().unwrap_or(self.config.default_timeout);
        let started = Instant::now();

        info!(
            command = %command,
            cwd = %invocation.working_dir().display(),
            timeout = %format_duration(timeout),
            "launching command"
        );

        if timeout.is_zero() {
            let err = CmdrunError::InvalidTimeout("timeout must be greater than zero".to_string());
            return launch_failed(command, err, started);
        }

        let LaunchedProcess {
            mut process,
            stdout,
            stderr,
        } = match launcher::launch(
            invocation,
            &self.config.env,
            self.config.kill_process_tree,
        ) {
            Ok(launched) => launched,
            Err(err) => return launch_failed(command, err, started),
        };

        // Drain before waiting, or a chatty child stalls on a full pipe.
        let collector = StreamCollector::spawn(stdout, stderr);
        debug!(pid = ?process.pid(), "command running");

        match supervise(&mut process, timeout).await {
            Supervision::Exited(status) => {
                let budget = timeout
                    .saturating_sub(started.elapsed())
                    .max(self.config.kill_grace);
                let output = collector.finish_within(budget).await;
                if output.truncated {
                    warn!(
                        pid = ?process.pid(),
                        "output pipes still open after exit; killing leftover processes"
                    );
                }
                process.kill_leftovers(output.truncated);

                let Some(exit_code) = exit_code_of(status) else {
                    let err = CmdrunError::Other(anyhow::anyhow!(
                        "process ended without an exit code or signal ({status:?})"
                    ));
                    return launch_failed(command, err, started);
                };
                let success = exit_code == 0;
                let elapsed = started.elapsed();
                info!(
                    command = %command,
                    exit_code,
                    success,
                    ?elapsed,
                    "command completed"
                );
                ExecutionResult::completed(command, exit_code, output.stdout, output.stderr, elapsed)
            }

            Supervision::TimedOut => {
                process.terminate().await;
                let output = collector.finish_within(self.config.kill_grace).await;
                let elapsed = started.elapsed();
                warn!(
                    command = %command,
                    timeout = %format_duration(timeout),
                    ?elapsed,
                    "command timed out and was killed"
                );
                ExecutionResult::timed_out(command, timeout, output.stdout, output.stderr, elapsed)
            }

            Supervision::WaitFailed(e) => {
                process.terminate().await;
                drop(collector);
                launch_failed(command, CmdrunError::IoError(e), started)
            }
        }
    }

    /// Blocking variant of [`execute`](Self::execute) for synchronous callers.
    ///
    /// Drives the call on a private current-thread runtime. When the caller is
    /// already inside a runtime, that private runtime lives on a scoped helper
    /// thread and the calling thread blocks until it finishes.
    pub fn execute_blocking(&self, invocation: &Invocation) -> ExecutionResult {
        if tokio::runtime::Handle::try_current().is_err() {
            return self.block_on_private_runtime(invocation);
        }

        debug!("execute_blocking called inside a runtime; using a helper thread");
        std::thread::scope(|scope| {
            match scope
                .spawn(|| self.block_on_private_runtime(invocation))
                .join()
            {
                Ok(result) => result,
                Err(_) => {
                    warn!("blocking execution thread panicked");
                    ExecutionResult::launch_failed(
                        invocation.command_line(),
                        "blocking execution thread panicked".to_string(),
                        Duration::ZERO,
                    )
                }
            }
        })
    }

    fn block_on_private_runtime(&self, invocation: &Invocation) -> ExecutionResult {
        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt.block_on(self.execute(invocation)),
            Err(e) => {
                warn!(error = %e, "failed to build runtime for blocking execution");
                ExecutionResult::launch_failed(
                    invocation.command_line(),
                    format!("failed to start async runtime: {e}"),
                    Duration::ZERO,
                )
            }
        }
    }
}

fn launch_failed(command: String, err: CmdrunError, started: Instant) -> ExecutionResult {
    warn!(command = %command, error = %err, "command could not be run");
    ExecutionResult::launch_failed(command, err.to_string(), started.elapsed())
}
