// Process Invocation Domain Model
// One spawn-to-exit lifecycle of an external program

use std::time::Duration;

/// A fully resolved process invocation (program + argv + env + timeout)
///
/// Arguments are always passed as a vector, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Environment overrides applied on top of the inherited environment
    pub env: Vec<(String, String)>,
    /// `Duration::ZERO` means no timeout
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            timeout: Duration::ZERO,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_timeout(&self) -> bool {
        !self.timeout.is_zero()
    }

    /// Command line for logging
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Terminal status of a process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationStatus {
    /// Exited with code 0
    Success,
    /// Exited with a nonzero code
    ExitCode(i32),
    /// Terminated by the timeout or by a signal
    Killed,
    /// Could not be started at all
    SpawnFailed(String),
}

/// Output stream of a child process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Stdout => write!(f, "stdout"),
            StreamKind::Stderr => write!(f, "stderr"),
        }
    }
}

/// Raw result of one invocation, before any exit-code policy is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub status: InvocationStatus,
    /// First stream read error (stdout before stderr)
    pub stream_error: Option<String>,
}

impl ProcessOutput {
    pub fn new(status: InvocationStatus) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: Vec::new(),
            status,
            stream_error: None,
        }
    }

    pub fn success() -> Self {
        Self::new(InvocationStatus::Success)
    }

    pub fn exit_code(code: i32) -> Self {
        if code == 0 {
            Self::success()
        } else {
            Self::new(InvocationStatus::ExitCode(code))
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<Vec<u8>>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn with_stderr(mut self, stderr: impl Into<Vec<u8>>) -> Self {
        self.stderr = stderr.into();
        self
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}
