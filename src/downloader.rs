//! One-shot PDF download: fetch a URL, write the body to disk

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::path::Path;
use tracing::debug;

use crate::config::Config;
use crate::errors::RowError;
use crate::models::Outcome;

/// Source of document bytes. The batch only talks to this trait.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, RowError>;
}

/// HTTP GET with a fixed timeout. No retries.
pub struct HttpFetcher {
    client: Client,
    timeout_seconds: u64,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self::with_client(client, config.http.timeout_seconds))
    }

    /// Wrap a preconfigured client. `timeout_seconds` is only used for error reporting.
    pub fn with_client(client: Client, timeout_seconds: u64) -> Self {
        Self {
            client,
            timeout_seconds,
        }
    }

    fn classify(&self, err: reqwest::Error) -> RowError {
        if err.is_timeout() {
            RowError::Timeout {
                seconds: self.timeout_seconds,
            }
        } else {
            RowError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, RowError> {
        debug!("Downloading from: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RowError::Http {
                status: status.as_u16(),
            });
        }

        let content = response.bytes().await.map_err(|e| self.classify(e))?;
        debug!("Received {} bytes from {}", content.len(), url);
        Ok(content.to_vec())
    }
}

/// Download `url` into `dest`, overwriting any existing file.
///
/// Nothing is written unless the fetch succeeds. Write failures are reported
/// as a row failure like any other.
pub async fn download_to(fetcher: &dyn Fetcher, url: &Url, dest: &Path) -> Outcome {
    let content = match fetcher.fetch(url).await {
        Ok(content) => content,
        Err(e) => return Outcome::Failure(e),
    };

    match tokio::fs::write(dest, &content).await {
        Ok(()) => Outcome::Success {
            path: dest.to_path_buf(),
            bytes: content.len() as u64,
        },
        Err(e) => Outcome::Failure(RowError::Filesystem {
            path: dest.to_path_buf(),
            message: e.to_string(),
        }),
    }
}
