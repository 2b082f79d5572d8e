// tests/exit_codes.rs
#![cfg(unix)]

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use cmdrun::exec::result::exit_code_of;

#[test]
fn test_normal_exit_reports_its_code() {
    assert_eq!(exit_code_of(ExitStatus::from_raw(0)), Some(0));
    assert_eq!(exit_code_of(ExitStatus::from_raw(3 << 8)), Some(3));
}

#[test]
fn test_signal_death_reports_128_plus_signal() {
    // Raw wait status for a child killed by SIGKILL.
    assert_eq!(exit_code_of(ExitStatus::from_raw(9)), Some(137));
    assert_eq!(exit_code_of(ExitStatus::from_raw(15)), Some(143));
}

#[test]
fn test_stopped_status_has_no_real_code() {
    // WIFSTOPPED with SIGSTOP: neither an exit code nor a terminating signal.
    let stopped = ExitStatus::from_raw((19 << 8) | 0x7f);
    assert_eq!(exit_code_of(stopped), None);
}
