// Command Descriptor & exit-code policy
// Immutable configuration for a family of invocations of one provider

use std::collections::BTreeSet;
use std::time::Duration;
use tracing::debug;

use crate::domain::{Invocation, InvocationStatus, ProcessOutput};
use crate::error::{AppError, Result};
use crate::port::ProcessRunner;

/// Command descriptor
///
/// Built once per provider with the builder methods; per-call descriptors are
/// derived with [`CommandSpec::derive`] / [`CommandSpec::for_program`], which
/// clone instead of mutating the shared base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    timeout: Duration,
    accepted: BTreeSet<i32>,
    elevation: Option<String>,
    stderr_allow: Vec<Vec<u8>>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            timeout: Duration::ZERO,
            accepted: BTreeSet::new(),
            elevation: None,
            stderr_allow: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    /// Add an environment override (a later value for the same key wins)
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exit codes treated as non-fatal in addition to zero
    pub fn accept_exit_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.accepted.extend(codes);
        self
    }

    /// Prefix every invocation with an elevation command (e.g. `sudo`)
    pub fn elevate(mut self, elevation: Option<String>) -> Self {
        self.elevation = elevation.filter(|e| !e.is_empty());
        self
    }

    /// Treat a failing call as success when stderr contains `pattern`
    pub fn allow_stderr(mut self, pattern: impl Into<Vec<u8>>) -> Self {
        self.stderr_allow.push(pattern.into());
        self
    }

    /// Per-call descriptor: same configuration with `args` appended
    pub fn derive<I, S>(&self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clone().args(args)
    }

    /// Descriptor for a helper program sharing env, timeout and elevation
    ///
    /// Arguments, acceptance set and stderr patterns are not inherited.
    pub fn for_program(&self, program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: self.env.clone(),
            timeout: self.timeout,
            accepted: BTreeSet::new(),
            elevation: self.elevation.clone(),
            stderr_allow: Vec::new(),
        }
    }

    /// Same descriptor without the elevation prefix
    pub fn unelevated(&self) -> Self {
        let mut spec = self.clone();
        spec.elevation = None;
        spec
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn set_program(&mut self, program: impl Into<String>) {
        self.program = program.into();
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn accepted_exit_codes(&self) -> &BTreeSet<i32> {
        &self.accepted
    }

    pub fn elevation(&self) -> Option<&str> {
        self.elevation.as_deref()
    }

    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }

    /// Effective environment: one entry per key, later overrides win,
    /// first-seen key order kept
    pub fn effective_env(&self) -> Vec<(String, String)> {
        let mut resolved: Vec<(String, String)> = Vec::with_capacity(self.env.len());
        for (key, value) in &self.env {
            match resolved.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = value.clone(),
                None => resolved.push((key.clone(), value.clone())),
            }
        }
        resolved
    }

    /// Materialise the invocation (elevation command first when configured)
    pub fn invocation(&self) -> Invocation {
        let (program, args) = match &self.elevation {
            Some(elevation) => {
                let mut args = Vec::with_capacity(self.args.len() + 1);
                args.push(self.program.clone());
                args.extend(self.args.iter().cloned());
                (elevation.clone(), args)
            }
            None => (self.program.clone(), self.args.clone()),
        };

        Invocation {
            program,
            args,
            env: self.effective_env(),
            timeout: self.timeout,
        }
    }

    /// Whether an exit code is non-fatal for this descriptor
    pub fn is_accepted(&self, code: i32) -> bool {
        code == 0 || self.accepted.contains(&code)
    }

    /// Apply the exit-code policy to a raw process result
    ///
    /// Precedence: spawn failure, kill, stream error, exit code.
    pub fn classify(&self, output: ProcessOutput) -> Result<ProcessOutput> {
        match &output.status {
            InvocationStatus::SpawnFailed(reason) => {
                return Err(AppError::SpawnFailed {
                    program: self.program.clone(),
                    reason: reason.clone(),
                })
            }
            InvocationStatus::Killed => {
                return Err(AppError::Killed {
                    program: self.program.clone(),
                    timeout_ms: (!self.timeout.is_zero())
                        .then(|| self.timeout.as_millis() as u64),
                })
            }
            _ => {}
        }

        if let Some(reason) = &output.stream_error {
            return Err(AppError::Stream {
                program: self.program.clone(),
                reason: reason.clone(),
            });
        }

        let code = match output.status {
            InvocationStatus::ExitCode(code) => code,
            _ => 0,
        };

        if self.is_accepted(code) {
            return Ok(output);
        }

        if self.stderr_is_allowed(&output.stderr) {
            debug!(
                program = %self.program,
                exit_code = code,
                "Failure tolerated by stderr pattern"
            );
            return Ok(output);
        }

        Err(AppError::CommandFailed {
            program: self.program.clone(),
            code,
            stderr: output.stderr_lossy(),
        })
    }

    fn stderr_is_allowed(&self, stderr: &[u8]) -> bool {
        !stderr.is_empty()
            && self
                .stderr_allow
                .iter()
                .any(|pattern| contains_bytes(stderr, pattern))
    }

    /// Run through `runner` and classify the result
    pub async fn run(&self, runner: &dyn ProcessRunner) -> Result<ProcessOutput> {
        let output = runner.run(&self.invocation()).await;
        self.classify(output)
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}
