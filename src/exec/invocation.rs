// src/exec/invocation.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::Result;
use crate::exec::args::{ArgList, quote_arg};

/// Immutable description of one command to run.
///
/// Everything the engine needs for a call travels in this value, including
/// the working directory, so concurrent calls never share mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: ArgList,
    working_dir: PathBuf,
    timeout: Option<Duration>,
    env: BTreeMap<String, String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: ArgList::new(),
            working_dir: working_dir.into(),
            timeout: None,
            env: BTreeMap::new(),
        }
    }

    /// Build an invocation from a pre-joined argument string.
    pub fn from_arg_string(
        program: impl Into<String>,
        args: &str,
        working_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        Ok(Self::new(program, working_dir).with_args(ArgList::parse(args)?))
    }

    pub fn with_args(mut self, args: ArgList) -> Self {
        self.args = args;
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg);
        self
    }

    /// Override the engine's default timeout for this call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &ArgList {
        &self.args
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn env_overrides(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Human-readable command text, used as the result's `command` field.
    pub fn command_line(&self) -> String {
        let program = quote_arg(&self.program);
        if self.args.is_empty() {
            program
        } else {
            format!("{} {}", program, self.args.render())
        }
    }
}
