// src/exec/supervisor.rs

use std::process::ExitStatus;
use std::time::Duration;

use tracing::{debug, warn};

use crate::exec::launcher::ProcessGuard;

/// How the wait on a running child ended.
#[derive(Debug)]
pub enum Supervision {
    /// The child exited on its own before the deadline.
    Exited(ExitStatus),
    /// The deadline elapsed first. The child is still running.
    TimedOut,
    /// Waiting on the child failed at the OS level.
    WaitFailed(std::io::Error),
}

/// Race the child's exit against `timeout`.
///
/// This only observes; killing a timed-out child is up to the caller, which
/// also owns the stream collectors that need draining afterwards.
pub async fn supervise(process: &mut ProcessGuard, timeout: Duration) -> Supervision {
    let pid = process.pid();

    match tokio::time::timeout(timeout, process.wait()).await {
        Ok(Ok(status)) => {
            debug!(?pid, %status, "child exited");
            Supervision::Exited(status)
        }
        Ok(Err(e)) => {
            warn!(?pid, error = %e, "waiting on child failed");
            Supervision::WaitFailed(e)
        }
        Err(_elapsed) => {
            warn!(?pid, ?timeout, "child exceeded its timeout");
            Supervision::TimedOut
        }
    }
}
