// src/exec/launcher.rs

//! Process launcher and the owning process handle.

use std::collections::BTreeMap;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::{debug, warn};

use crate::errors::{CmdrunError, Result};
use crate::exec::invocation::Invocation;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// A started child with its output pipes taken out for the collectors.
pub struct LaunchedProcess {
    pub process: ProcessGuard,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
}

/// Exclusive owner of one child process.
///
/// If the guard is dropped before the child has been reaped, the child (and
/// its process group, when tree kill is enabled) is killed on the spot.
pub struct ProcessGuard {
    child: Child,
    pid: Option<u32>,
    kill_tree: bool,
    reaped: bool,
}

impl ProcessGuard {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Wait for the child to exit. Marks the guard as reaped on success.
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        let status = self.child.wait().await?;
        self.reaped = true;
        Ok(status)
    }

    /// Kill the child (and its process group) and reap it.
    pub async fn terminate(&mut self) {
        if self.reaped {
            return;
        }
        if self.kill_tree {
            self.signal_group();
        }
        match self.child.kill().await {
            Ok(()) => debug!(pid = ?self.pid, "child process killed"),
            Err(e) => warn!(pid = ?self.pid, error = %e, "failed to kill child process"),
        }
        self.reaped = true;
    }

    /// Kill whatever is left of the child's process group after the child
    /// itself has exited (e.g. background descendants holding the pipes).
    ///
    /// The leader is already reaped, so the group id is only known to be
    /// live while some member still holds a pipe open. Callers pass
    /// `pipes_open` from the collector and nothing is signalled once both
    /// readers reached EOF.
    pub fn kill_leftovers(&self, pipes_open: bool) {
        if !pipes_open {
            debug!(pid = ?self.pid, "pipes closed; no leftover processes to kill");
            return;
        }
        if self.kill_tree {
            self.signal_group();
        }
    }

    #[cfg(unix)]
    fn signal_group(&self) {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        let Some(pid) = self.pid else {
            return;
        };
        // The child was started as the leader of its own group, so its pid
        // is the group id.
        match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            Ok(()) => debug!(pgid = pid, "sent SIGKILL to process group"),
            Err(Errno::ESRCH) => debug!(pgid = pid, "process group already gone"),
            Err(e) => warn!(pgid = pid, error = %e, "failed to signal process group"),
        }
    }

    #[cfg(not(unix))]
    fn signal_group(&self) {}
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        debug!(pid = ?self.pid, "process guard dropped before reap; killing child");
        if self.kill_tree {
            self.signal_group();
        }
        let _ = self.child.start_kill();
    }
}

/// Start the child described by `invocation`.
///
/// `base_env` is applied first; the invocation's own overrides win.
pub fn launch(
    invocation: &Invocation,
    base_env: &BTreeMap<String, String>,
    kill_tree: bool,
) -> Result<LaunchedProcess> {
    validate_working_dir(invocation)?;

    let mut cmd = Command::new(invocation.program());
    cmd.args(invocation.args().iter())
        .current_dir(invocation.working_dir())
        .envs(base_env)
        .envs(invocation.env_overrides())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    {
        if kill_tree {
            cmd.process_group(0);
        }
    }

    #[cfg(windows)]
    {
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    let mut child = cmd.spawn().map_err(|source| CmdrunError::Spawn {
        program: invocation.program().to_string(),
        source,
    })?;

    let pid = child.id();
    debug!(program = %invocation.program(), ?pid, "child process spawned");

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let process = ProcessGuard {
        child,
        pid,
        kill_tree,
        reaped: false,
    };

    // `process` is dropped (and killed) if either pipe is missing.
    let stdout = stdout.ok_or(CmdrunError::MissingPipe("stdout"))?;
    let stderr = stderr.ok_or(CmdrunError::MissingPipe("stderr"))?;

    Ok(LaunchedProcess {
        process,
        stdout,
        stderr,
    })
}

fn validate_working_dir(invocation: &Invocation) -> Result<()> {
    let dir = invocation.working_dir();
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(CmdrunError::WorkingDirectory {
            path: dir.to_path_buf(),
            reason: "not a directory".to_string(),
        }),
        Err(e) => Err(CmdrunError::WorkingDirectory {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}
