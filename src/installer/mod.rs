//! Installer stage.
//!
//! Replaces the installation in place from a downloaded archive. The
//! installer is a small state machine:
//!
//! ```text
//! Idle -> Extracted -> Replaced -> VersionPersisted -> Done
//!   \________\____________\______________\________-> Failed(reason)
//! ```
//!
//! - **Idle -> Extracted**: find the archive's top-level directory, remove a
//!   stale copy left by an earlier failed run, extract into the installation
//!   root.
//! - **Extracted -> Replaced**: merge-copy the extracted tree over the
//!   installation root. Files are overwritten one by one; an interrupted copy
//!   leaves a mixed installation.
//! - **Replaced -> VersionPersisted**: remove the extracted directory and
//!   compression leftovers, then record the new version in the marker file.
//!
//! The marker file is written only after every file has been copied, so a
//! failed copy never records a version as installed. The extracted directory
//! is removed on every exit path.
//!
//! All work here is blocking file I/O; async callers run it on the blocking
//! pool.

pub mod archive;

use crate::config::UpdaterConfig;
use crate::core::UpdaterError;
use crate::utils::fs::{merge_copy, remove_dir_all, remove_file_if_exists};
use crate::utils::platform::ArchiveKind;
use crate::version::{MarkerFile, Version};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Installer progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    Idle,
    Extracted,
    Replaced,
    VersionPersisted,
    Done,
    Failed(UpdaterError),
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Extracted => write!(f, "extracted"),
            Self::Replaced => write!(f, "replaced"),
            Self::VersionPersisted => write!(f, "version persisted"),
            Self::Done => write!(f, "done"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Removes the extraction directory when dropped.
struct ExtractionGuard {
    path: PathBuf,
    armed: bool,
}

impl ExtractionGuard {
    const fn new(path: PathBuf) -> Self {
        Self {
            path,
            armed: true,
        }
    }

    /// Remove the directory now, reporting failure.
    fn remove(mut self) -> anyhow::Result<()> {
        self.armed = false;
        remove_dir_all(&self.path)
    }
}

impl Drop for ExtractionGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        debug!("Cleaning up {}", self.path.display());
        if let Err(e) = remove_dir_all(&self.path) {
            warn!("Failed to remove extraction directory: {e:#}");
        }
    }
}

/// Applies a downloaded archive to the installation root.
pub struct Installer<'a> {
    config: &'a UpdaterConfig,
    cancel: CancellationToken,
    state: InstallState,
}

impl<'a> Installer<'a> {
    pub fn new(config: &'a UpdaterConfig, cancel: CancellationToken) -> Self {
        Self {
            config,
            cancel,
            state: InstallState::Idle,
        }
    }

    pub const fn state(&self) -> &InstallState {
        &self.state
    }

    /// Run the installer to completion.
    ///
    /// On failure the state becomes [`InstallState::Failed`] and the same error
    /// is returned.
    pub fn install(
        &mut self,
        archive: &Path,
        kind: ArchiveKind,
        version: Version,
    ) -> Result<(), UpdaterError> {
        match self.run(archive, kind, version) {
            Ok(()) => {
                self.transition(InstallState::Done);
                Ok(())
            }
            Err(e) => {
                self.transition(InstallState::Failed(e.clone()));
                Err(e)
            }
        }
    }

    fn run(&mut self, archive: &Path, kind: ArchiveKind, version: Version) -> Result<(), UpdaterError> {
        let guard = self.extract(archive, kind)?;
        self.transition(InstallState::Extracted);

        self.check_cancelled()?;
        self.replace(&guard.path)?;
        self.transition(InstallState::Replaced);

        self.persist(guard, version)?;
        self.transition(InstallState::VersionPersisted);
        Ok(())
    }

    fn transition(&mut self, next: InstallState) {
        debug!("Installer: {} -> {}", self.state, next);
        self.state = next;
    }

    fn check_cancelled(&self) -> Result<(), UpdaterError> {
        if self.cancel.is_cancelled() {
            Err(UpdaterError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn extract(&self, archive_path: &Path, kind: ArchiveKind) -> Result<ExtractionGuard, UpdaterError> {
        let root = &self.config.install_root;

        let names = archive::entry_names(archive_path, kind, 2)
            .map_err(|e| UpdaterError::install("reading archive", archive_path, format!("{e:#}")))?;
        let top = archive::top_level_dir(&names).ok_or_else(|| {
            UpdaterError::install(
                "reading archive",
                archive_path,
                "archive has no single top-level directory",
            )
        })?;

        let extracted = root.join(&top);
        if extracted.exists() {
            info!("Removing stale {} from an earlier run", extracted.display());
            remove_dir_all(&extracted).map_err(|e| {
                UpdaterError::install("removing stale extraction directory", &extracted, format!("{e:#}"))
            })?;
        }

        // Guard before extracting so a half-extracted tree is removed too.
        let guard = ExtractionGuard::new(extracted);

        info!("Extracting {} into {}", archive_path.display(), root.display());
        archive::extract(archive_path, kind, root)
            .map_err(|e| UpdaterError::install("extracting archive", archive_path, format!("{e:#}")))?;

        if !guard.path.is_dir() {
            return Err(UpdaterError::install(
                "extracting archive",
                &guard.path,
                "top-level directory missing after extraction",
            ));
        }

        Ok(guard)
    }

    fn replace(&self, extracted: &Path) -> Result<(), UpdaterError> {
        let root = &self.config.install_root;
        info!("Copying {} over {}", extracted.display(), root.display());

        let copied = merge_copy(extracted, root, |_| {
            if self.cancel.is_cancelled() {
                return Err(UpdaterError::Cancelled.into());
            }
            Ok(())
        })
        .map_err(|e| match e.downcast_ref::<UpdaterError>() {
            Some(UpdaterError::Cancelled) => UpdaterError::Cancelled,
            _ => UpdaterError::install("copying files", root, format!("{e:#}")),
        })?;

        info!("Replaced {copied} file(s)");
        Ok(())
    }

    fn persist(&self, guard: ExtractionGuard, version: Version) -> Result<(), UpdaterError> {
        if let Err(e) = guard.remove() {
            warn!("Failed to remove extraction directory: {e:#}");
        }
        self.remove_sidecars();

        MarkerFile::new(self.config.marker_path()).write(version)
    }

    /// Remove compression leftovers from the installation root.
    fn remove_sidecars(&self) {
        let root = &self.config.install_root;
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to list {}: {e}", root.display());
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && self.config.is_sidecar(&path) {
                debug!("Removing leftover {}", path.display());
                if let Err(e) = remove_file_if_exists(&path) {
                    warn!("{e:#}");
                }
            }
        }
    }
}
