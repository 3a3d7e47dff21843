// Key Fetcher Port
// HTTP download helper for repository keys and repo files

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait KeyFetcher: Send + Sync {
    /// Download `url` and return the body
    ///
    /// # Errors
    /// - AppError::Download on transport failure or non-success status
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Mock fetcher serving fixed bodies; unknown URLs fail
    #[derive(Clone, Default)]
    pub struct MockKeyFetcher {
        bodies: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        requested: Arc<Mutex<Vec<String>>>,
    }
    impl MockKeyFetcher {
        pub fn new() -> Self {
            Self::default()
        }
        pub fn serve(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.bodies
                .lock()
                .unwrap()
                .insert(url.to_string(), body.into());
            self
        }
        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }
    #[async_trait]
    impl KeyFetcher for MockKeyFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.requested.lock().unwrap().push(url.to_string());
            self.bodies
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::Download(format!("404 Not Found: {}", url)))
        }
    }
}
