// Key fetcher implementation
// reason: reqwest for HTTPS downloads of signing keys and .repo files
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use sysmanage_core::error::{AppError, Result};
use sysmanage_core::port::KeyFetcher;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("sysmanage/", env!("CARGO_PKG_VERSION"));

pub struct HttpKeyFetcher {
    client: reqwest::Client,
}

impl HttpKeyFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Download(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl KeyFetcher for HttpKeyFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        info!(url = %url, "Downloading");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Download(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Download(format!("{}: HTTP {}", url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Download(format!("{}: {}", url, e)))?;
        debug!(url = %url, bytes = body.len(), "Download complete");
        Ok(body.to_vec())
    }
}
