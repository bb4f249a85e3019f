//! HTTP access.
//!
//! The workflow needs exactly two requests: the listing page as text and the
//! asset as a byte stream. [`Transport`] keeps those behind a small interface
//! so tests can serve canned pages and archives.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use std::time::Duration;

/// A streaming response body.
pub struct ResponseBody {
    /// `Content-Length`, when the server sent one
    pub content_length: Option<u64>,
    /// Body chunks in order
    pub chunks: BoxStream<'static, Result<Bytes>>,
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseBody").field("content_length", &self.content_length).finish_non_exhaustive()
    }
}

/// Capability for the two HTTP requests the updater makes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and return the body as text. Non-success statuses are errors.
    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String>;

    /// GET `url` and return the body as a stream. Non-success statuses are errors.
    async fn get_body(&self, url: &str) -> Result<ResponseBody>;
}

/// [`Transport`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client with the given User-Agent and connect timeout.
    ///
    /// Asset downloads have no overall deadline; only the listing request is
    /// bounded by the per-request timeout.
    pub fn new(user_agent: &str, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(connect_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()?;

        response.text().await.context("Failed to read response body")
    }

    async fn get_body(&self, url: &str) -> Result<ResponseBody> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()?;

        Ok(ResponseBody {
            content_length: response.content_length(),
            chunks: response.bytes_stream().map(|chunk| chunk.map_err(anyhow::Error::from)).boxed(),
        })
    }
}
