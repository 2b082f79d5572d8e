use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cmdrun::exec::{CommandRunner, ExecutionResult, ExecutionStatus, Invocation};

/// A fake runner that:
/// - records every invocation it was asked to run
/// - replies with queued results in order, or a successful empty result
///   once the queue is exhausted.
#[derive(Clone, Default)]
pub struct FakeRunner {
    invocations: Arc<Mutex<Vec<Invocation>>>,
    replies: Arc<Mutex<VecDeque<ExecutionResult>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next call.
    pub fn reply(self, result: ExecutionResult) -> Self {
        self.replies.lock().unwrap().push_back(result);
        self
    }

    /// Every invocation seen so far, in call order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn run<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = ExecutionResult> + Send + 'a>> {
        let invocations = Arc::clone(&self.invocations);
        let replies = Arc::clone(&self.replies);

        Box::pin(async move {
            invocations.lock().unwrap().push(invocation.clone());

            let queued = replies.lock().unwrap().pop_front();
            queued.unwrap_or_else(|| completed(invocation.command_line(), 0, "", ""))
        })
    }
}

/// Build a `Completed` result by hand.
pub fn completed(command: impl Into<String>, exit_code: i32, output: &str, error: &str) -> ExecutionResult {
    ExecutionResult {
        command: command.into(),
        output: output.to_string(),
        error: error.to_string(),
        exit_code,
        status: ExecutionStatus::Completed,
        duration: Duration::ZERO,
    }
}

/// Build a `TimedOut` result by hand.
pub fn timed_out(command: impl Into<String>) -> ExecutionResult {
    ExecutionResult {
        command: command.into(),
        output: String::new(),
        error: "command timed out after 1s".to_string(),
        exit_code: cmdrun::exec::EXIT_CODE_TIMED_OUT,
        status: ExecutionStatus::TimedOut,
        duration: Duration::from_secs(1),
    }
}

/// Build a `LaunchFailed` result by hand.
pub fn launch_failed(command: impl Into<String>, message: &str) -> ExecutionResult {
    ExecutionResult {
        command: command.into(),
        output: String::new(),
        error: message.to_string(),
        exit_code: cmdrun::exec::EXIT_CODE_LAUNCH_FAILURE,
        status: ExecutionStatus::LaunchFailed,
        duration: Duration::ZERO,
    }
}
