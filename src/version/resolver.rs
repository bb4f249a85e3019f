//! Version Resolver stage: produce `(local, remote)` or fail.

use super::{MarkerFile, Version, VersionProbe, parse_remote_version};
use crate::config::UpdaterConfig;
use crate::core::UpdaterError;
use crate::fetcher::Transport;
use tracing::{debug, info};

/// Output of the resolver.
///
/// The listing body is kept because the Artifact Fetcher scans the same page
/// for asset links; it is fetched only once per run.
#[derive(Debug, Clone)]
pub struct ResolvedVersions {
    pub local: Version,
    pub remote: Version,
    pub listing: String,
}

/// Determines the installed and the latest published build.
pub struct VersionResolver<'a, T: ?Sized, P: ?Sized> {
    config: &'a UpdaterConfig,
    transport: &'a T,
    probe: &'a P,
}

impl<'a, T, P> VersionResolver<'a, T, P>
where
    T: Transport + ?Sized,
    P: VersionProbe + ?Sized,
{
    pub const fn new(config: &'a UpdaterConfig, transport: &'a T, probe: &'a P) -> Self {
        Self {
            config,
            transport,
            probe,
        }
    }

    /// Resolve both versions. The local version is resolved first so a
    /// corrupt marker is reported without touching the network.
    pub async fn resolve(&self) -> Result<ResolvedVersions, UpdaterError> {
        let local = self.local_version().await?;
        let listing = self.fetch_listing().await?;
        let remote = self.remote_version(&listing)?;

        info!("Installed build {local}, latest published build {remote}");
        Ok(ResolvedVersions {
            local,
            remote,
            listing,
        })
    }

    /// Marker file first, then the executable probe.
    pub async fn local_version(&self) -> Result<Version, UpdaterError> {
        let marker = MarkerFile::new(self.config.marker_path());
        if let Some(version) = marker.read().await? {
            return Ok(version);
        }

        debug!("Falling back to probing the installed executable");
        self.probe.probe(self.config).await
    }

    /// Download the release listing page.
    pub async fn fetch_listing(&self) -> Result<String, UpdaterError> {
        let url = &self.config.releases_url;
        debug!("Fetching release listing from {url}");

        self.transport
            .get_text(url, self.config.request_timeout)
            .await
            .map_err(|e| UpdaterError::RemoteFetchFailed {
                url: url.clone(),
                reason: format!("{e:#}"),
            })
    }

    fn remote_version(&self, listing: &str) -> Result<Version, UpdaterError> {
        parse_remote_version(&self.config.remote_version_pattern, listing).ok_or_else(|| {
            UpdaterError::RemoteParseFailed {
                url: self.config.releases_url.clone(),
                pattern: self.config.remote_version_pattern.as_str().to_string(),
            }
        })
    }
}
