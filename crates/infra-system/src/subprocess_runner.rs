// Subprocess runner
// reason: tokio process + concurrent pipe draining; nix killpg so the timeout
// reaches grandchildren holding the pipes
use async_trait::async_trait;
use std::future::Future;
use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use sysmanage_core::domain::{Invocation, InvocationStatus, ProcessOutput, StreamKind};
use sysmanage_core::port::{OutputSink, ProcessRunner};

type StreamResult = (Vec<u8>, Option<io::Error>);

/// How long the pipes may stay open once the process group has been killed
const KILL_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Process runner backed by real child processes
///
/// stdout and stderr are drained by two tasks while the parent waits, so a
/// child filling either pipe never blocks on the other.
pub struct SubprocessRunner {
    sink: Arc<dyn OutputSink>,
}

impl SubprocessRunner {
    /// Runner forwarding captured lines to tracing at debug level
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    pub fn with_sink(sink: Arc<dyn OutputSink>) -> Self {
        Self { sink }
    }

    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group: killpg reaches the whole tree
        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }

    /// Drain one pipe line by line, forwarding each line to the sink
    fn drain<R>(
        &self,
        reader: Option<R>,
        program: String,
        stream: StreamKind,
    ) -> JoinHandle<StreamResult>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let sink = self.sink.clone();
        tokio::spawn(async move {
            let mut captured = Vec::new();
            let Some(reader) = reader else {
                return (captured, None);
            };

            let mut reader = BufReader::new(reader);
            let mut line = Vec::new();
            loop {
                line.clear();
                match reader.read_until(b'\n', &mut line).await {
                    Ok(0) => return (captured, None),
                    Ok(_) => {
                        sink.line(&program, stream, &line);
                        captured.extend_from_slice(&line);
                    }
                    Err(e) => return (captured, Some(e)),
                }
            }
        })
    }
}

impl Default for SubprocessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRunner for SubprocessRunner {
    async fn run(&self, invocation: &Invocation) -> ProcessOutput {
        let program = invocation.program.clone();
        debug!(command = %invocation.display(), timeout = ?invocation.timeout, "Spawning process");

        let mut child = match Self::command(invocation).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %program, error = %e, "Spawn failed");
                return ProcessOutput::new(InvocationStatus::SpawnFailed(e.to_string()));
            }
        };

        // captured before wait(): tokio forgets the pid once the child is reaped
        let pid = child.id();
        let deadline = invocation
            .has_timeout()
            .then(|| Instant::now() + invocation.timeout);

        let stdout = self.drain(child.stdout.take(), program.clone(), StreamKind::Stdout);
        let stderr = self.drain(child.stderr.take(), program.clone(), StreamKind::Stderr);
        let aborts = [stdout.abort_handle(), stderr.abort_handle()];
        let streams = join_streams(stdout, stderr);
        tokio::pin!(streams);

        // One deadline bounds both the wait and the drain: a background
        // process that inherited the pipes outlives the direct child.
        let wait = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, child.wait()).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(program = %program, timeout = ?invocation.timeout, "Timeout expired, killing process group");
                    return terminate(pid, &mut child, streams, &aborts).await;
                }
            },
            None => child.wait().await,
        };

        let (out, err) = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, &mut streams).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(
                        program = %program,
                        timeout = ?invocation.timeout,
                        "Timeout expired with pipes still open, killing process group"
                    );
                    return terminate(pid, &mut child, streams, &aborts).await;
                }
            },
            None => streams.await,
        };

        let status = match wait {
            Ok(status) => match status.code() {
                Some(0) => InvocationStatus::Success,
                Some(code) => InvocationStatus::ExitCode(code),
                // terminated by a signal
                None => InvocationStatus::Killed,
            },
            Err(e) => {
                warn!(program = %program, error = %e, "Wait failed");
                InvocationStatus::SpawnFailed(e.to_string())
            }
        };

        let mut output = ProcessOutput::new(status);
        output.stream_error = out
            .1
            .as_ref()
            .map(|e| format!("stdout: {}", e))
            .or_else(|| err.1.as_ref().map(|e| format!("stderr: {}", e)));
        output.stdout = out.0;
        output.stderr = err.0;

        info!(
            program = %program,
            status = ?output.status,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "Process finished"
        );
        output
    }
}

async fn join_streams(
    stdout: JoinHandle<StreamResult>,
    stderr: JoinHandle<StreamResult>,
) -> (StreamResult, StreamResult) {
    let (out, err) = tokio::join!(stdout, stderr);
    (flatten(out), flatten(err))
}

fn flatten(joined: Result<StreamResult, tokio::task::JoinError>) -> StreamResult {
    joined.unwrap_or_else(|e| (Vec::new(), Some(io::Error::new(io::ErrorKind::Other, e))))
}

/// Kill the group, reap the child and collect what the pipes still hold
///
/// Readers still blocked after the grace period (a process that left the
/// group) are aborted.
async fn terminate<F>(
    pid: Option<u32>,
    child: &mut Child,
    mut streams: F,
    aborts: &[AbortHandle],
) -> ProcessOutput
where
    F: Future<Output = (StreamResult, StreamResult)> + Unpin,
{
    kill_process_group(pid, child);
    // reap; the status is irrelevant once killed
    let _ = child.wait().await;

    let (out, err) = match tokio::time::timeout(KILL_DRAIN_GRACE, &mut streams).await {
        Ok(joined) => joined,
        Err(_) => {
            for handle in aborts {
                handle.abort();
            }
            streams.await
        }
    };

    let mut output = ProcessOutput::new(InvocationStatus::Killed);
    output.stdout = out.0;
    output.stderr = err.0;
    output
}

/// SIGKILL the child's process group (Unix) or the child itself
///
/// The group id stays valid after the leader is reaped, as long as any
/// member is alive.
fn kill_process_group(pid: Option<u32>, child: &mut Child) {
    #[cfg(not(unix))]
    let _ = pid;

    #[cfg(unix)]
    {
        if let Some(pid) = pid {
            if let Ok(pid) = i32::try_from(pid) {
                let pgid = nix::unistd::Pid::from_raw(pid);
                if let Err(e) = nix::sys::signal::killpg(pgid, nix::sys::signal::Signal::SIGKILL) {
                    debug!(pid = pid, error = %e, "killpg failed");
                }
            }
        }
    }

    if let Err(e) = child.start_kill() {
        debug!(error = %e, "Child already exited");
    }
}

/// Sink forwarding captured lines to tracing at debug level
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn line(&self, program: &str, stream: StreamKind, line: &[u8]) {
        debug!(
            program = %program,
            stream = %stream,
            line = %String::from_utf8_lossy(line).trim_end(),
            "Captured output"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct RecordingSink {
        lines: Mutex<Vec<(StreamKind, String)>>,
    }

    impl OutputSink for RecordingSink {
        fn line(&self, _program: &str, stream: StreamKind, line: &[u8]) {
            self.lines
                .lock()
                .unwrap()
                .push((stream, String::from_utf8_lossy(line).into_owned()));
        }
    }

    fn sh(script: &str) -> Invocation {
        Invocation::new("sh").args(["-c", script])
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_both_streams() {
        let runner = SubprocessRunner::new();
        let output = runner.run(&sh("echo out; echo err >&2; exit 3")).await;

        assert_eq!(output.status, InvocationStatus::ExitCode(3));
        assert_eq!(output.stdout, b"out\n");
        assert_eq!(output.stderr, b"err\n");
        assert!(output.stream_error.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_lines_reach_the_sink() {
        let sink = Arc::new(RecordingSink::default());
        let runner = SubprocessRunner::with_sink(sink.clone());

        runner.run(&sh("printf 'a\\nb\\n'; printf 'c' >&2")).await;

        let mut lines = sink.lines.lock().unwrap().clone();
        lines.sort_by(|a, b| a.1.cmp(&b.1));
        assert_eq!(
            lines,
            vec![
                (StreamKind::Stdout, "a\n".to_string()),
                (StreamKind::Stdout, "b\n".to_string()),
                (StreamKind::Stderr, "c".to_string()),
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills() {
        let runner = SubprocessRunner::new();
        let started = Instant::now();

        let output = runner
            .run(&sh("sleep 5").timeout(Duration::from_millis(300)))
            .await;

        assert_eq!(output.status, InvocationStatus::Killed);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let runner = SubprocessRunner::new();
        let output = runner
            .run(&Invocation::new("/nonexistent/definitely-not-here"))
            .await;

        assert!(matches!(output.status, InvocationStatus::SpawnFailed(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_env_override() {
        let runner = SubprocessRunner::new();
        let output = runner
            .run(&sh("printf %s \"$LANG\"").env("LANG", "C"))
            .await;

        assert_eq!(output.stdout, b"C");
    }
}
