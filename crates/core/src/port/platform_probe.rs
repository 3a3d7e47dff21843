// Platform Probe Port
// reason: distribution detection is an external collaborator of the core

use crate::domain::Platform;
use crate::error::Result;

/// Platform probe port
///
/// Detected once per process lifetime; callers cache the result.
pub trait PlatformProbe: Send + Sync {
    /// Detect the running system, distribution, version and code name
    ///
    /// # Errors
    /// - AppError::NotFound when the running OS is not one of the supported systems
    fn detect(&self) -> Result<Platform>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Mock probe returning a fixed platform
    pub struct MockPlatformProbe {
        platform: Platform,
    }
    impl MockPlatformProbe {
        pub fn new(platform: Platform) -> Self {
            Self { platform }
        }
    }
    impl PlatformProbe for MockPlatformProbe {
        fn detect(&self) -> Result<Platform> {
            Ok(self.platform.clone())
        }
    }
}
