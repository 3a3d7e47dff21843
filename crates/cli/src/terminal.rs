// Terminal output: color policy and child-output echo

use colored::Colorize;
use std::io::Write;

use sysmanage_core::domain::StreamKind;
use sysmanage_core::port::OutputSink;

/// Disable colors for `NO_COLOR` or a dumb terminal
pub fn init_colors() {
    let dumb = std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false);
    if std::env::var_os("NO_COLOR").is_some() || dumb {
        colored::control::set_override(false);
    }
}

/// Sink echoing child output lines to stderr, prefixed by the stream
pub struct TerminalSink;

impl OutputSink for TerminalSink {
    fn line(&self, _program: &str, stream: StreamKind, line: &[u8]) {
        let text = String::from_utf8_lossy(line);
        let prefix = match stream {
            StreamKind::Stdout => "│".dimmed(),
            StreamKind::Stderr => "│".yellow(),
        };
        let mut err = std::io::stderr().lock();
        // write errors (closed terminal) are ignored
        let _ = writeln!(err, "{} {}", prefix, text.trim_end());
    }
}
