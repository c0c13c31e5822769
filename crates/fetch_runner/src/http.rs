//! HttpFetcher - reqwest-backed `Fetcher`

use contracts::{FetchError, Fetcher};
use tracing::trace;

/// Fetcher sharing one `reqwest::Client` connection pool.
///
/// Only the status line is consumed; the body is dropped unread.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with a default client.
    ///
    /// # Errors
    /// Returns `FetchError::Runtime` if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FetchError::runtime(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, task_id: usize, url: &str) -> Result<u16, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(task_id, url, e.to_string()))?;

        let status = response.status().as_u16();
        trace!(task_id, status, "Response received");
        Ok(status)
    }
}
