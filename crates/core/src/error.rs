// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Every failure is returned to the immediate caller; nothing in the core
/// retries or swallows an error.
#[derive(Error, Debug)]
pub enum AppError {
    /// Executable missing or pipes could not be created
    #[error("Failed to spawn `{program}`: {reason}")]
    SpawnFailed { program: String, reason: String },

    /// Timeout elapsed (or a signal arrived) and the process was terminated
    ///
    /// `timeout_ms` is `None` when no timeout was armed.
    #[error("Process `{program}` was {}", kill_cause(.timeout_ms))]
    Killed {
        program: String,
        timeout_ms: Option<u64>,
    },

    /// Exit code outside of the acceptance set
    #[error("Command `{program}` failed with exit code {code}\n[stderr]\n{stderr}")]
    CommandFailed {
        program: String,
        code: i32,
        stderr: String,
    },

    /// Reading one of the child's output streams failed
    #[error("Reading output of `{program}` failed: {reason}")]
    Stream { program: String, reason: String },

    #[error("Operation `{operation}` is not supported by {backend}")]
    Unsupported {
        backend: String,
        operation: &'static str,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn unsupported(backend: impl std::fmt::Display, operation: &'static str) -> Self {
        AppError::Unsupported {
            backend: backend.to_string(),
            operation,
        }
    }

    /// Exit code carried by a `CommandFailed` error
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            AppError::CommandFailed { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_killed(&self) -> bool {
        matches!(self, AppError::Killed { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, AppError::Unsupported { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

fn kill_cause(timeout_ms: &Option<u64>) -> String {
    match timeout_ms {
        Some(ms) => format!("killed (timeout {}ms)", ms),
        None => "terminated by a signal".to_string(),
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display_carries_stderr() {
        let err = AppError::CommandFailed {
            program: "apt-get".to_string(),
            code: 100,
            stderr: "E: Unable to locate package foo".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("exit code 100"));
        assert!(msg.contains("[stderr]\nE: Unable to locate package foo"));
        assert_eq!(err.exit_code(), Some(100));
    }

    #[test]
    fn test_predicates() {
        assert!(AppError::unsupported("RPM", "add_repo").is_unsupported());
        assert!(AppError::NotFound("x".into()).is_not_found());
        assert!(AppError::Killed {
            program: "sh".into(),
            timeout_ms: Some(10)
        }
        .is_killed());
        assert_eq!(AppError::InvalidInput("x".into()).exit_code(), None);
    }

    #[test]
    fn test_killed_display_names_the_cause() {
        let timed_out = AppError::Killed {
            program: "dnf".into(),
            timeout_ms: Some(1500),
        };
        assert_eq!(
            timed_out.to_string(),
            "Process `dnf` was killed (timeout 1500ms)"
        );

        let signalled = AppError::Killed {
            program: "dnf".into(),
            timeout_ms: None,
        };
        assert_eq!(
            signalled.to_string(),
            "Process `dnf` was terminated by a signal"
        );
    }
}
