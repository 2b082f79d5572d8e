// src/exec/result.rs

use std::process::ExitStatus;
use std::time::Duration;

use crate::types::{ExecutionStatus, format_duration};

/// Exit code reported when the process could not be started, or a runtime
/// fault happened while wiring or waiting on it.
pub const EXIT_CODE_LAUNCH_FAILURE: i32 = -1000;

/// Exit code reported when the process exceeded its timeout and was killed.
pub const EXIT_CODE_TIMED_OUT: i32 = -1001;

/// Outcome of one invocation. Built exactly once per call.
///
/// `exit_code` is either the child's real exit code or one of the two
/// sentinels above; `status` carries the same information out of band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub command: String,
    pub output: String,
    pub error: String,
    pub exit_code: i32,
    pub status: ExecutionStatus,
    pub duration: Duration,
}

impl ExecutionResult {
    pub(crate) fn completed(
        command: String,
        exit_code: i32,
        stdout: Vec<String>,
        stderr: Vec<String>,
        duration: Duration,
    ) -> Self {
        Self {
            command,
            output: join_lines(stdout),
            error: join_lines(stderr),
            exit_code,
            status: ExecutionStatus::Completed,
            duration,
        }
    }

    pub(crate) fn timed_out(
        command: String,
        timeout: Duration,
        stdout: Vec<String>,
        stderr: Vec<String>,
        duration: Duration,
    ) -> Self {
        let mut error = format!("command timed out after {}", format_duration(timeout));
        let partial = join_lines(stderr);
        if !partial.is_empty() {
            error.push('\n');
            error.push_str(&partial);
        }
        Self {
            command,
            output: join_lines(stdout),
            error,
            exit_code: EXIT_CODE_TIMED_OUT,
            status: ExecutionStatus::TimedOut,
            duration,
        }
    }

    pub(crate) fn launch_failed(command: String, message: String, duration: Duration) -> Self {
        Self {
            command,
            output: String::new(),
            error: message,
            exit_code: EXIT_CODE_LAUNCH_FAILURE,
            status: ExecutionStatus::LaunchFailed,
            duration,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn is_timed_out(&self) -> bool {
        self.status == ExecutionStatus::TimedOut
    }
}

/// Map an OS exit status onto the result's exit code.
///
/// A Unix child terminated by a signal reports `128 + signal`. A status with
/// neither a code nor a signal (e.g. a stopped child) has no real exit code
/// and yields `None`.
pub fn exit_code_of(status: ExitStatus) -> Option<i32> {
    if let Some(code) = status.code() {
        return Some(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Some(128 + signal);
        }
    }

    None
}

fn join_lines(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.truncate(text.trim_end().len());
    text
}
