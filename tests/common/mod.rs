#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

pub use cmdrun_test_utils::builders::sh;
pub use cmdrun_test_utils::{init_tracing, with_timeout};

/// Read a pid written by a child into `dir/name`.
pub fn read_pid(dir: &Path, name: &str) -> i32 {
    let text = std::fs::read_to_string(dir.join(name)).expect("pid file written by child");
    text.trim().parse().expect("pid file holds a number")
}

/// True once `pid` no longer names a live process.
///
/// A killed process whose parent is gone may linger as a zombie until
/// something reaps it, so zombies count as dead.
#[cfg(target_os = "linux")]
pub fn is_dead(pid: i32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Err(_) => true,
        // Format: `pid (comm) state ...`; comm may contain spaces.
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .map(|state| state == "Z" || state == "X")
            .unwrap_or(true),
    }
}

#[cfg(all(unix, not(target_os = "linux")))]
pub fn is_dead(pid: i32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid), None).is_err()
}

/// Poll `is_dead` for up to two seconds.
#[cfg(unix)]
pub async fn wait_until_dead(pid: i32) -> bool {
    for _ in 0..40 {
        if is_dead(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}
