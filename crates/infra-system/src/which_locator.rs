// Executable locator backed by the `which` crate
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::debug;

use sysmanage_core::port::ExecutableLocator;

/// Looks executables up on `PATH`, or on a fixed search path
#[derive(Debug, Default, Clone)]
pub struct WhichLocator {
    search_path: Option<OsString>,
}

impl WhichLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search `path` (a `PATH`-style list) instead of the process `PATH`
    pub fn with_search_path(path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(path.into()),
        }
    }
}

impl ExecutableLocator for WhichLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        let found = match &self.search_path {
            Some(path) => {
                let cwd = std::env::current_dir().ok()?;
                which::which_in(name, Some(path), cwd)
            }
            None => which::which(name),
        };

        match found {
            Ok(path) => {
                debug!(executable = %name, path = %path.display(), "Located executable");
                Some(path)
            }
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_locates_sh() {
        let path = WhichLocator::new().locate("sh").unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("sh"));
    }

    #[test]
    fn test_missing_executable() {
        assert!(WhichLocator::new()
            .locate("sysmanage-no-such-tool-4f2c")
            .is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_search_path_is_exclusive() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("pacman");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let locator = WhichLocator::with_search_path(dir.path());
        assert_eq!(locator.locate("pacman"), Some(tool));
        assert!(locator.locate("sh").is_none());
    }
}
