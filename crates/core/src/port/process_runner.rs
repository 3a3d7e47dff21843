// Process Runner Port
// Abstraction for spawning one external process and capturing its output

use async_trait::async_trait;

use crate::domain::{Invocation, ProcessOutput};

/// Process Runner trait
///
/// Implementations:
/// - SubprocessRunner: spawns a real child process (infra-system)
/// - MockProcessRunner: scripted results for tests
///
/// The runner applies no exit-code policy; it reports what happened and the
/// caller's [`CommandSpec`](crate::application::CommandSpec) classifies it.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Spawn `invocation`, drain stdout and stderr concurrently, and wait for
    /// exit or for the timeout to kill it
    ///
    /// Never fails: spawn errors are reported as
    /// `InvocationStatus::SpawnFailed` inside the output.
    async fn run(&self, invocation: &Invocation) -> ProcessOutput;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Mock Process Runner for testing
    ///
    /// Returns queued outputs in order, then succeeds with empty output.
    #[derive(Clone, Default)]
    pub struct MockProcessRunner {
        outputs: Arc<Mutex<VecDeque<ProcessOutput>>>,
        invocations: Arc<Mutex<Vec<Invocation>>>,
    }
    impl MockProcessRunner {
        pub fn new() -> Self {
            Self::default()
        }
        pub fn with_outputs(outputs: impl IntoIterator<Item = ProcessOutput>) -> Self {
            let runner = Self::new();
            for output in outputs {
                runner.push(output);
            }
            runner
        }
        pub fn push(&self, output: ProcessOutput) {
            self.outputs.lock().unwrap().push_back(output);
        }
        pub fn invocations(&self) -> Vec<Invocation> {
            self.invocations.lock().unwrap().clone()
        }
        pub fn call_count(&self) -> usize {
            self.invocations.lock().unwrap().len()
        }
        /// Program + args of every invocation, joined by spaces
        pub fn command_lines(&self) -> Vec<String> {
            self.invocations
                .lock()
                .unwrap()
                .iter()
                .map(Invocation::display)
                .collect()
        }
    }
    #[async_trait]
    impl ProcessRunner for MockProcessRunner {
        async fn run(&self, invocation: &Invocation) -> ProcessOutput {
            self.invocations.lock().unwrap().push(invocation.clone());
            self.outputs
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(ProcessOutput::success)
        }
    }
}
