// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::HumanDuration;

/// Command-line arguments for `cmdrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdrun",
    version,
    about = "Run a program with captured output and a hard timeout.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `Cmdrun.toml` in the current directory is used when it
    /// exists; otherwise built-in defaults apply.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Working directory for the program. Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Timeout such as `30s`, `500ms`, `2m`. Overrides the configured default.
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<HumanDuration>,

    /// Extra arguments as one pre-joined, shell-quoted string.
    ///
    /// Appended after the positional arguments.
    #[arg(long, value_name = "STRING", allow_hyphen_values = true)]
    pub args_string: Option<String>,

    /// Extra environment variable for the program (repeatable).
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve config and arguments, print the invocation, but don't run it.
    #[arg(long)]
    pub dry_run: bool,

    /// Program to run (name on `PATH` or a path).
    #[arg(value_name = "PROGRAM")]
    pub program: String,

    /// Arguments passed to the program verbatim.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
