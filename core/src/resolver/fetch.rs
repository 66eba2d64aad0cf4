//! # Fetching
//!
//! The seam through which the resolver loads other documents.

use crate::error::{AppError, AppResult};
use crate::refs::pointer::is_remote;
use std::future::Future;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

/// Loads the raw content stored at a location.
pub trait Fetcher: Send + Sync {
    /// Returns the content at `location` (file path, `file://` URL or `http(s)` URL).
    fn fetch(&self, location: &str) -> impl Future<Output = AppResult<String>> + Send;
}

/// Filesystem and HTTP fetcher.
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    client: reqwest::Client,
}

impl DefaultFetcher {
    /// Creates a fetcher with a default HTTP client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Creates a fetcher that sends requests through `client`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_remote(&self, location: &str) -> AppResult<String> {
        let response = self.client.get(location).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch {
                location: location.to_string(),
                message: format!("HTTP {}", status),
            });
        }
        Ok(response.text().await?)
    }

    async fn fetch_file(&self, location: &str) -> AppResult<String> {
        let path = match Url::parse(location) {
            Ok(url) if url.scheme() == "file" => url.to_file_path().map_err(|_| AppError::Fetch {
                location: location.to_string(),
                message: "not a valid file URL".to_string(),
            })?,
            _ => PathBuf::from(location),
        };
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::Fetch {
                location: location.to_string(),
                message: e.to_string(),
            })
    }
}

impl Default for DefaultFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for DefaultFetcher {
    async fn fetch(&self, location: &str) -> AppResult<String> {
        debug!(%location, "fetching document");
        if is_remote(location) {
            self.fetch_remote(location).await
        } else {
            self.fetch_file(location).await
        }
    }
}
