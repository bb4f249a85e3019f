//! Streaming asset download.

use super::Transport;
use crate::core::UpdaterError;
use crate::utils::fs::{ensure_parent_dir, remove_file_if_exists};
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Progress report passed to the download callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Bytes written so far
    pub downloaded: u64,
    /// Expected size, when the server reported one
    pub total: Option<u64>,
}

/// Stream `url` into `dest`, truncating any previous file there.
///
/// `on_progress` is called once before the first chunk and after every chunk.
/// `cancel` is checked between chunks. On any failure the partial file is
/// removed; it must never be treated as a valid archive. Returns the number
/// of bytes written.
pub async fn download_to_file<T, F>(
    transport: &T,
    url: &str,
    dest: &Path,
    cancel: &CancellationToken,
    mut on_progress: F,
) -> Result<u64, UpdaterError>
where
    T: Transport + ?Sized,
    F: FnMut(DownloadProgress) + Send,
{
    let result = stream_to_file(transport, url, dest, cancel, &mut on_progress).await;

    if result.is_err()
        && let Err(e) = remove_file_if_exists(dest)
    {
        warn!("Failed to remove partial download: {e:#}");
    }

    result
}

async fn stream_to_file<T, F>(
    transport: &T,
    url: &str,
    dest: &Path,
    cancel: &CancellationToken,
    on_progress: &mut F,
) -> Result<u64, UpdaterError>
where
    T: Transport + ?Sized,
    F: FnMut(DownloadProgress) + Send,
{
    let failed = |reason: String| UpdaterError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    if cancel.is_cancelled() {
        return Err(UpdaterError::Cancelled);
    }

    info!("Downloading {url}");
    let mut body = transport.get_body(url).await.map_err(|e| failed(format!("{e:#}")))?;
    let total = body.content_length;
    debug!("Content-Length: {total:?}");

    ensure_parent_dir(dest).map_err(|e| failed(format!("{e:#}")))?;
    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| failed(format!("failed to create {}: {e}", dest.display())))?;

    let mut downloaded = 0u64;
    on_progress(DownloadProgress {
        downloaded,
        total,
    });

    loop {
        let chunk = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(UpdaterError::Cancelled),
            chunk = body.chunks.next() => chunk,
        };

        let Some(chunk) = chunk else {
            break;
        };
        let chunk = chunk.map_err(|e| failed(format!("{e:#}")))?;

        file.write_all(&chunk)
            .await
            .map_err(|e| failed(format!("failed to write {}: {e}", dest.display())))?;
        downloaded += chunk.len() as u64;
        on_progress(DownloadProgress {
            downloaded,
            total,
        });
    }

    file.flush().await.map_err(|e| failed(format!("failed to flush {}: {e}", dest.display())))?;
    file.sync_all().await.map_err(|e| failed(format!("failed to sync {}: {e}", dest.display())))?;

    if let Some(expected) = total
        && expected != downloaded
    {
        return Err(failed(format!("expected {expected} bytes, received {downloaded}")));
    }

    info!("Downloaded {downloaded} bytes to {}", dest.display());
    Ok(downloaded)
}
