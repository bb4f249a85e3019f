//! Fake capability implementations.

use crate::config::UpdaterConfig;
use crate::core::UpdaterError;
use crate::fetcher::{ProcessInfo, ProcessInspector, ResponseBody, Transport};
use crate::version::{Version, VersionProbe};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

enum FakeAsset {
    Chunks(Vec<Vec<u8>>),
    Failing {
        head: Vec<u8>,
        error: String,
    },
}

/// Serves one listing page and any number of assets from memory.
///
/// Unknown asset URLs fail like a 404.
pub struct FakeTransport {
    listing: std::result::Result<String, String>,
    assets: HashMap<String, FakeAsset>,
    text_requests: AtomicUsize,
    body_requests: AtomicUsize,
}

impl FakeTransport {
    pub fn new(listing: impl Into<String>) -> Self {
        Self {
            listing: Ok(listing.into()),
            assets: HashMap::new(),
            text_requests: AtomicUsize::new(0),
            body_requests: AtomicUsize::new(0),
        }
    }

    /// Listing requests fail with `reason`.
    pub fn failing_listing(reason: impl Into<String>) -> Self {
        Self {
            listing: Err(reason.into()),
            ..Self::new("")
        }
    }

    /// Serve `url` as the given chunks, with a matching `Content-Length`.
    #[must_use]
    pub fn with_asset(mut self, url: impl Into<String>, chunks: Vec<Vec<u8>>) -> Self {
        self.assets.insert(url.into(), FakeAsset::Chunks(chunks));
        self
    }

    /// Serve `head` for `url`, then fail the stream with `error`.
    #[must_use]
    pub fn with_failing_asset(
        mut self,
        url: impl Into<String>,
        head: Vec<u8>,
        error: impl Into<String>,
    ) -> Self {
        self.assets.insert(
            url.into(),
            FakeAsset::Failing {
                head,
                error: error.into(),
            },
        );
        self
    }

    pub fn text_requests(&self) -> usize {
        self.text_requests.load(Ordering::SeqCst)
    }

    pub fn body_requests(&self) -> usize {
        self.body_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_text(&self, url: &str, _timeout: Duration) -> Result<String> {
        self.text_requests.fetch_add(1, Ordering::SeqCst);
        self.listing.clone().map_err(|reason| anyhow!("GET {url}: {reason}"))
    }

    async fn get_body(&self, url: &str) -> Result<ResponseBody> {
        self.body_requests.fetch_add(1, Ordering::SeqCst);

        match self.assets.get(url) {
            Some(FakeAsset::Chunks(chunks)) => {
                let total = chunks.iter().map(|c| c.len() as u64).sum();
                let items: Vec<Result<Bytes>> =
                    chunks.iter().map(|c| Ok(Bytes::from(c.clone()))).collect();
                Ok(ResponseBody {
                    content_length: Some(total),
                    chunks: stream::iter(items).boxed(),
                })
            }
            Some(FakeAsset::Failing {
                head,
                error,
            }) => {
                let items: Vec<Result<Bytes>> =
                    vec![Ok(Bytes::from(head.clone())), Err(anyhow!("{error}"))];
                Ok(ResponseBody {
                    content_length: None,
                    chunks: stream::iter(items).boxed(),
                })
            }
            None => Err(anyhow!("HTTP status client error (404 Not Found) for url ({url})")),
        }
    }
}

/// Version probe with a canned answer.
pub struct FakeProbe {
    result: std::result::Result<Version, String>,
    calls: AtomicUsize,
}

impl FakeProbe {
    pub fn version(build: u32) -> Self {
        Self {
            result: Ok(Version::new(build)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            result: Err(reason.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionProbe for FakeProbe {
    async fn probe(&self, config: &UpdaterConfig) -> std::result::Result<Version, UpdaterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(|reason| UpdaterError::VersionProbeFailed {
            executable: config.executable_path().display().to_string(),
            reason,
        })
    }
}

/// Fixed process list.
#[derive(Debug, Clone, Default)]
pub struct FakeProcesses {
    processes: Vec<ProcessInfo>,
    current_pid: Option<u32>,
}

impl FakeProcesses {
    pub fn new(processes: Vec<ProcessInfo>) -> Self {
        Self {
            processes,
            current_pid: None,
        }
    }

    #[must_use]
    pub fn with_current_pid(mut self, pid: u32) -> Self {
        self.current_pid = Some(pid);
        self
    }
}

impl ProcessInspector for FakeProcesses {
    fn list_processes(&self) -> Vec<ProcessInfo> {
        self.processes.clone()
    }

    fn current_pid(&self) -> Option<u32> {
        self.current_pid
    }
}
