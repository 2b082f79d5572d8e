// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs external programs with `tokio::process::Command` and
//! turns every outcome into an [`ExecutionResult`].
//!
//! - [`invocation`] describes what to run.
//! - [`args`] builds and splits argument lists.
//! - [`launcher`] spawns the child and owns its handle.
//! - [`collector`] drains stdout and stderr concurrently.
//! - [`supervisor`] races exit against the timeout.
//! - [`result`] holds the result type and sentinel exit codes.
//! - [`engine`] ties the pieces together.
//! - [`backend`] provides the `CommandRunner` trait that callers depend on,
//!   and which tests can replace with a fake.

pub mod args;
pub mod backend;
pub mod collector;
pub mod engine;
pub mod invocation;
pub mod launcher;
pub mod result;
pub mod supervisor;

pub use args::ArgList;
pub use backend::CommandRunner;
pub use engine::{CommandEngine, DEFAULT_KILL_GRACE, DEFAULT_TIMEOUT, EngineConfig};
pub use invocation::Invocation;
pub use result::{EXIT_CODE_LAUNCH_FAILURE, EXIT_CODE_TIMED_OUT, ExecutionResult};
pub use crate::types::ExecutionStatus;
