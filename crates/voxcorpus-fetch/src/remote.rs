//! Remote retrieval seam.
//!
//! The fetcher only knows this trait; tests drive it with an in-process
//! source, production uses HTTP.

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::FetchError;

/// Retrieves one remote resource into a local file.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Retrieve `url` into `dest`, overwriting it. Implementations must
    /// either produce the complete body or return an error; the caller
    /// handles atomic placement.
    async fn retrieve(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// HTTP retrieval over a shared connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn retrieve(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let http_err = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };
        let io_err = |source| FetchError::Io {
            path: dest.display().to_string(),
            source,
        };

        let mut response = self.client.get(url).send().await.map_err(http_err)?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(dest).await.map_err(io_err)?;
        while let Some(chunk) = response.chunk().await.map_err(http_err)? {
            file.write_all(&chunk).await.map_err(io_err)?;
        }
        file.flush().await.map_err(io_err)?;
        Ok(())
    }
}
