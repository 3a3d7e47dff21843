// Executable Locator Port
// $PATH probing used by the dispatcher's detect fallback

use std::path::PathBuf;

/// Resolve an executable name to an absolute path
pub trait ExecutableLocator: Send + Sync {
    /// Returns `None` when `name` is not found on the execution `PATH`
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;

    /// Mock locator backed by a fixed name -> path table
    #[derive(Default)]
    pub struct MockExecutableLocator {
        paths: HashMap<String, PathBuf>,
    }
    impl MockExecutableLocator {
        pub fn new() -> Self {
            Self::default()
        }
        pub fn with(mut self, name: &str, path: &str) -> Self {
            self.paths.insert(name.to_string(), PathBuf::from(path));
            self
        }
    }
    impl ExecutableLocator for MockExecutableLocator {
        fn locate(&self, name: &str) -> Option<PathBuf> {
            self.paths.get(name).cloned()
        }
    }
}
