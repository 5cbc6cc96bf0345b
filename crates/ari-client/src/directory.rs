//! Directory providers
//!
//! The renewal-info endpoint comes from the CA's directory, which can be
//! refreshed at any time. Providers are read on every client call so a
//! capability can appear or disappear between calls.

use ari_proto::Directory;
use http::header::ACCEPT;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use thiserror::Error;
use tracing::{debug, info};

use crate::transport::{build_client, HttpTransportConfig};

/// Source of the currently known renewal-info endpoint
pub trait DirectoryProvider: Send + Sync {
    /// Returns the renewal-info URL, or `None` if the CA doesn't offer ARI
    fn renewal_info_url(&self) -> Option<String>;
}

impl DirectoryProvider for Directory {
    fn renewal_info_url(&self) -> Option<String> {
        Directory::renewal_info_url(self).map(str::to_string)
    }
}

/// Directory snapshot that can be swapped while clients hold it
#[derive(Debug, Clone, Default)]
pub struct SharedDirectory {
    inner: Arc<RwLock<Directory>>,
}

impl SharedDirectory {
    pub fn new(directory: Directory) -> Self {
        Self {
            inner: Arc::new(RwLock::new(directory)),
        }
    }

    /// Replace the snapshot; subsequent reads observe the new directory
    pub fn replace(&self, directory: Directory) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = directory;
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> Directory {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Directory> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DirectoryProvider for SharedDirectory {
    fn renewal_info_url(&self) -> Option<String> {
        self.read().renewal_info_url().map(str::to_string)
    }
}

/// Directory loading errors
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Failed to fetch directory: {0}")]
    Request(String),

    #[error("Directory {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid directory document: {0}")]
    InvalidDocument(String),
}

/// Loads ACME directory documents over HTTP
///
/// The reqwest client is built once from an [`HttpTransportConfig`], so the
/// fetcher shares its timeout, User-Agent and TLS settings with
/// [`HttpTransport`](crate::HttpTransport) and reuses connections across refreshes.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    client: reqwest::Client,
}

impl DirectoryFetcher {
    pub fn new(config: &HttpTransportConfig) -> Result<Self, DirectoryError> {
        let client = build_client(config).map_err(|e| DirectoryError::Request(e.to_string()))?;
        Ok(Self { client })
    }

    /// Fetch and parse the directory at `url`
    pub async fn fetch(&self, url: &str) -> Result<Directory, DirectoryError> {
        debug!("Fetching ACME directory from {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| DirectoryError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DirectoryError::Request(e.to_string()))?;

        let directory = Directory::from_slice(&body)
            .map_err(|e| DirectoryError::InvalidDocument(e.to_string()))?;

        info!(
            "Loaded ACME directory from {} (renewal info: {})",
            url,
            directory.renewal_info_url().unwrap_or("not offered")
        );

        Ok(directory)
    }

    /// Fetch the directory at `url` and swap it into `target`
    ///
    /// On failure `target` keeps its previous snapshot.
    pub async fn refresh(&self, url: &str, target: &SharedDirectory) -> Result<(), DirectoryError> {
        let directory = self.fetch(url).await?;
        target.replace(directory);
        Ok(())
    }
}
