// src/exec/backend.rs

//! Pluggable runner abstraction.
//!
//! Callers that build invocations (subcommand wrappers, the CLI) talk to a
//! `CommandRunner` instead of the engine directly. Production code uses
//! [`CommandEngine`]; tests can substitute a runner that returns canned
//! results without spawning anything.

use std::future::Future;
use std::pin::Pin;

use crate::exec::engine::CommandEngine;
use crate::exec::invocation::Invocation;
use crate::exec::result::ExecutionResult;

/// Trait abstracting how an invocation is executed.
pub trait CommandRunner: Send + Sync {
    /// Run one invocation and report its outcome.
    ///
    /// Implementations must always produce a result; failures are encoded
    /// in it rather than returned as errors.
    fn run<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = ExecutionResult> + Send + 'a>>;
}

impl CommandRunner for CommandEngine {
    fn run<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = ExecutionResult> + Send + 'a>> {
        Box::pin(self.execute(invocation))
    }
}
