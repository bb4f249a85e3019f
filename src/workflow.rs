//! The update workflow: resolve, decide, fetch, install.
//!
//! Stages run strictly in order and the first failure ends the run. The
//! downloaded archive is removed on every exit path once the download has
//! started, and the Installer removes its extraction directory the same way.

use crate::config::UpdaterConfig;
use crate::core::UpdaterError;
use crate::decision::{UpdateDecision, decide};
use crate::fetcher::{
    DownloadProgress, ProcessInspector, ReleaseAsset, Transport, download_to_file,
    ensure_no_running_instance, select_asset,
};
use crate::installer::{InstallState, Installer};
use crate::utils::fs::remove_file_if_exists;
use crate::version::{Version, VersionProbe, VersionResolver};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// Installed build is the latest; nothing was downloaded.
    UpToDate { version: Version },
    /// A newer build exists; reported by check-only runs.
    UpdateAvailable { from: Version, to: Version },
    /// The newer build was installed.
    Updated { from: Version, to: Version, asset: String },
}

/// Removes the downloaded archive when dropped.
struct ArchiveGuard {
    path: PathBuf,
}

impl Drop for ArchiveGuard {
    fn drop(&mut self) {
        debug!("Removing {}", self.path.display());
        if let Err(e) = remove_file_if_exists(&self.path) {
            warn!("Failed to remove downloaded archive: {e:#}");
        }
    }
}

/// Runs the four stages against injected capabilities.
pub struct UpdateWorkflow<'a, T: ?Sized, I: ?Sized, P: ?Sized> {
    config: &'a UpdaterConfig,
    transport: &'a T,
    processes: &'a I,
    probe: &'a P,
    cancel: CancellationToken,
}

impl<'a, T, I, P> UpdateWorkflow<'a, T, I, P>
where
    T: Transport + ?Sized,
    I: ProcessInspector + ?Sized,
    P: VersionProbe + ?Sized,
{
    pub fn new(
        config: &'a UpdaterConfig,
        transport: &'a T,
        processes: &'a I,
        probe: &'a P,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            transport,
            processes,
            probe,
            cancel,
        }
    }

    /// Resolve and decide only. Never downloads or touches the installation,
    /// apart from removing a corrupt marker.
    pub async fn check(&self) -> Result<WorkflowOutcome, UpdaterError> {
        let resolved = self.resolver().resolve().await?;
        outcome_for(resolved.local, resolved.remote)
    }

    /// Run the full workflow.
    ///
    /// `on_progress` receives download progress.
    pub async fn run<F>(&self, on_progress: F) -> Result<WorkflowOutcome, UpdaterError>
    where
        F: FnMut(DownloadProgress) + Send,
    {
        let resolved = self.resolver().resolve().await?;
        let (local, remote) = (resolved.local, resolved.remote);

        let outcome = outcome_for(local, remote)?;
        if !matches!(outcome, WorkflowOutcome::UpdateAvailable { .. }) {
            return Ok(outcome);
        }

        let asset = select_asset(self.config, &resolved.listing)?;
        ensure_no_running_instance(self.config, self.processes)?;

        let archive = self.download(&asset, on_progress).await?;
        let state = self.install(&archive.path, &asset, remote).await?;
        debug!("Installer finished in state {state}");

        info!("Updated from {local} to {remote}");
        Ok(WorkflowOutcome::Updated {
            from: local,
            to: remote,
            asset: asset.file_name().to_string(),
        })
    }

    fn resolver(&self) -> VersionResolver<'_, T, P> {
        VersionResolver::new(self.config, self.transport, self.probe)
    }

    async fn download<F>(&self, asset: &ReleaseAsset, on_progress: F) -> Result<ArchiveGuard, UpdaterError>
    where
        F: FnMut(DownloadProgress) + Send,
    {
        let guard = ArchiveGuard {
            path: self.config.archive_path(),
        };
        download_to_file(self.transport, &asset.url, &guard.path, &self.cancel, on_progress).await?;
        Ok(guard)
    }

    async fn install(
        &self,
        archive: &Path,
        asset: &ReleaseAsset,
        version: Version,
    ) -> Result<InstallState, UpdaterError> {
        if self.cancel.is_cancelled() {
            return Err(UpdaterError::Cancelled);
        }

        let config = self.config.clone();
        let cancel = self.cancel.clone();
        let archive = archive.to_path_buf();
        let kind = asset.kind;

        tokio::task::spawn_blocking(move || {
            let mut installer = Installer::new(&config, cancel);
            installer.install(&archive, kind, version).map(|()| installer.state().clone())
        })
        .await
        .map_err(|e| UpdaterError::Other {
            message: format!("Installer task failed: {e}"),
        })?
    }
}

fn outcome_for(local: Version, remote: Version) -> Result<WorkflowOutcome, UpdaterError> {
    match decide(local, remote) {
        UpdateDecision::UpToDate => Ok(WorkflowOutcome::UpToDate {
            version: local,
        }),
        UpdateDecision::UpdateAvailable => Ok(WorkflowOutcome::UpdateAvailable {
            from: local,
            to: remote,
        }),
        UpdateDecision::Inconsistent => Err(UpdaterError::Inconsistent {
            local: local.build(),
            remote: remote.build(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::ProcessInfo;
    use crate::test_utils::archives::zip_bytes;
    use crate::test_utils::{FakeProbe, FakeProcesses, FakeTransport, listing_page};
    use crate::utils::Platform;
    use tempfile::TempDir;

    const DEBUG: &str = "/download/mainline-0-1500/yuzu-windows-msvc-20230706-debugsymbols.zip";
    const CANONICAL: &str = "/download/mainline-0-1500/yuzu-windows-msvc-20230706-6b1f3e8f6.zip";

    fn setup() -> (TempDir, UpdaterConfig) {
        let temp = TempDir::new().unwrap();
        let config = UpdaterConfig::for_platform(Platform::Windows, temp.path().to_path_buf()).unwrap();
        (temp, config)
    }

    fn transport() -> FakeTransport {
        let url = format!("{}{CANONICAL}", crate::constants::RELEASES_URL);
        FakeTransport::new(listing_page(1500, &[DEBUG, CANONICAL]))
            .with_asset(url, vec![zip_bytes("yuzu-windows-msvc", &[("yuzu.exe", "1500")])])
    }

    #[tokio::test]
    async fn test_update_installs_and_removes_archive() {
        let (_temp, config) = setup();
        std::fs::write(config.marker_path(), "1234").unwrap();
        let transport = transport();

        let processes = FakeProcesses::default();
        let probe = FakeProbe::version(1);

        let workflow =
            UpdateWorkflow::new(&config, &transport, &processes, &probe, CancellationToken::new());
        let outcome = workflow.run(|_| {}).await.unwrap();

        assert_eq!(
            outcome,
            WorkflowOutcome::Updated {
                from: Version::new(1234),
                to: Version::new(1500),
                asset: "yuzu-windows-msvc-20230706-6b1f3e8f6.zip".into(),
            }
        );
        assert_eq!(std::fs::read_to_string(config.marker_path()).unwrap(), "1500");
        assert!(!config.archive_path().exists());
    }

    #[tokio::test]
    async fn test_up_to_date_skips_download() {
        let (_temp, config) = setup();
        std::fs::write(config.marker_path(), "1500").unwrap();
        let transport = transport();

        let processes = FakeProcesses::default();
        let probe = FakeProbe::version(1);

        let workflow =
            UpdateWorkflow::new(&config, &transport, &processes, &probe, CancellationToken::new());

        assert_eq!(
            workflow.run(|_| {}).await.unwrap(),
            WorkflowOutcome::UpToDate {
                version: Version::new(1500)
            }
        );
        assert_eq!(transport.body_requests(), 0);
    }

    #[tokio::test]
    async fn test_running_instance_blocks_download() {
        let (_temp, config) = setup();
        std::fs::write(config.marker_path(), "1234").unwrap();
        let transport = transport();
        let processes = FakeProcesses::new(vec![ProcessInfo::new("yuzu.exe", 4242)]);
        let probe = FakeProbe::version(1);

        let workflow =
            UpdateWorkflow::new(&config, &transport, &processes, &probe, CancellationToken::new());
        let err = workflow.run(|_| {}).await.unwrap_err();

        assert!(matches!(err, UpdaterError::InstanceRunning { pid: 4242, .. }));
        assert_eq!(transport.body_requests(), 0);
        assert_eq!(std::fs::read_to_string(config.marker_path()).unwrap(), "1234");
    }

    #[tokio::test]
    async fn test_check_reports_available_update() {
        let (_temp, config) = setup();
        let transport = transport();
        let processes = FakeProcesses::default();
        let probe = FakeProbe::version(1400);

        let workflow =
            UpdateWorkflow::new(&config, &transport, &processes, &probe, CancellationToken::new());

        assert_eq!(
            workflow.check().await.unwrap(),
            WorkflowOutcome::UpdateAvailable {
                from: Version::new(1400),
                to: Version::new(1500)
            }
        );
        assert_eq!(transport.body_requests(), 0);
        assert!(!config.marker_path().exists());
    }

    #[tokio::test]
    async fn test_failed_download_leaves_no_archive() {
        let (_temp, config) = setup();
        std::fs::write(config.marker_path(), "1234").unwrap();
        let transport = FakeTransport::new(listing_page(1500, &[DEBUG, CANONICAL]));

        let processes = FakeProcesses::default();
        let probe = FakeProbe::version(1);

        let workflow =
            UpdateWorkflow::new(&config, &transport, &processes, &probe, CancellationToken::new());
        let err = workflow.run(|_| {}).await.unwrap_err();

        assert!(matches!(err, UpdaterError::DownloadFailed { .. }));
        assert!(!config.archive_path().exists());
        assert_eq!(std::fs::read_to_string(config.marker_path()).unwrap(), "1234");
    }
}
