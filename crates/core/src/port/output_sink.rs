// Output Sink Port
// Receives captured child output lines; injected into the process runner at
// construction instead of a process-wide logger

use crate::domain::StreamKind;

pub trait OutputSink: Send + Sync {
    /// Called once per complete line (trailing newline included when present)
    fn line(&self, program: &str, stream: StreamKind, line: &[u8]);
}

/// Sink that drops every line
pub struct NullSink;

impl OutputSink for NullSink {
    fn line(&self, _program: &str, _stream: StreamKind, _line: &[u8]) {}
}
