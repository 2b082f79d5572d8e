// src/types.rs

//! Small shared value types: terminal states, stream names and the
//! human-readable duration format used by config and CLI.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::CmdrunError;

/// Terminal state of one invocation.
///
/// - `Completed`: the child ran to exit; the exit code is the child's own.
/// - `TimedOut`: the deadline elapsed first and the process was killed.
/// - `LaunchFailed`: the child could not be started, or a runtime fault
///   happened while wiring or waiting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Completed,
    TimedOut,
    LaunchFailed,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::TimedOut => "timed out",
            ExecutionStatus::LaunchFailed => "launch failed",
        };
        f.write_str(s)
    }
}

/// Which child stream a collector is draining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A duration written as `"<number><unit>"`, e.g. `"250ms"`, `"3s"`, `"2m"`.
///
/// Deserializes from a TOML string and displays back in the largest unit
/// that represents the value exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct HumanDuration(pub Duration);

impl HumanDuration {
    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl TryFrom<String> for HumanDuration {
    type Error = CmdrunError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for HumanDuration {
    type Err = CmdrunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s).map(HumanDuration)
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, CmdrunError> {
    let invalid = |reason: String| CmdrunError::InvalidDuration {
        input: s.to_string(),
        reason,
    };

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty duration string".to_string()));
    }

    // Find the boundary between digits and suffix.
    let idx = trimmed
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| invalid("duration missing unit suffix".to_string()))?;

    let (num_part, unit_part) = trimmed.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| invalid(format!("invalid number '{}': {}", num_part, e)))?;
    let unit = unit_part.trim().to_lowercase();

    let secs = |mult: u64| {
        value
            .checked_mul(mult)
            .map(Duration::from_secs)
            .ok_or_else(|| invalid("duration overflows".to_string()))
    };

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => secs(1),
        "m" => secs(60),
        "h" => secs(60 * 60),
        _ => Err(invalid(format!(
            "unsupported unit '{}'; expected ms, s, m, or h",
            unit
        ))),
    }
}

/// Render a duration in the largest whole unit (`h`, `m`, `s`, `ms`).
pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms != 0 && ms % 3_600_000 == 0 {
        format!("{}h", ms / 3_600_000)
    } else if ms != 0 && ms % 60_000 == 0 {
        format!("{}m", ms / 60_000)
    } else if ms != 0 && ms % 1_000 == 0 {
        format!("{}s", ms / 1_000)
    } else {
        format!("{}ms", ms)
    }
}
