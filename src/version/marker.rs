//! The version marker file.
//!
//! Once an update has completed, the installed build number is recorded in
//! `yuzu_version.txt` in the installation root as plain decimal digits with
//! no trailing newline. From then on the marker is the source of truth for
//! the local version.

use super::Version;
use crate::core::UpdaterError;
use crate::utils::fs::{atomic_write, remove_file_if_exists};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Handle on the marker file at a fixed path.
#[derive(Debug, Clone)]
pub struct MarkerFile {
    path: PathBuf,
}

impl MarkerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the recorded version.
    ///
    /// Returns `Ok(None)` when no marker exists.
    ///
    /// The updater itself only ever writes bare digits. On read, leading and
    /// trailing whitespace is stripped first, so a hand-edited `" 1500\n"`
    /// is accepted as build 1500 rather than reported as corrupt. Anything
    /// else that is not purely digits, including whitespace between digits,
    /// is [`UpdaterError::CorruptMarker`], and the file is deleted before
    /// returning so the next run probes the executable instead.
    pub async fn read(&self) -> Result<Option<Version>, UpdaterError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No version marker at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(UpdaterError::Other {
                    message: format!(
                        "Failed to read version marker {}: {e}",
                        self.path.display()
                    ),
                });
            }
        };

        let content = String::from_utf8_lossy(&bytes);
        if let Some(version) = Version::parse(content.trim()) {
            debug!("Version marker records build {version}");
            return Ok(Some(version));
        }

        warn!("Removing corrupt version marker {}", self.path.display());
        if let Err(e) = remove_file_if_exists(&self.path) {
            warn!("Failed to remove corrupt marker: {e:#}");
        }

        Err(UpdaterError::CorruptMarker {
            path: self.path.display().to_string(),
            content: content.trim().chars().take(64).collect(),
        })
    }

    /// Record `version`, replacing any previous content.
    pub fn write(&self, version: Version) -> Result<(), UpdaterError> {
        atomic_write(&self.path, version.to_string().as_bytes())
            .map_err(|e| UpdaterError::install("writing version marker", &self.path, format!("{e:#}")))?;
        debug!("Recorded build {version} in {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn marker(temp: &TempDir) -> MarkerFile {
        MarkerFile::new(temp.path().join("yuzu_version.txt"))
    }

    #[tokio::test]
    async fn test_missing_marker_is_none() {
        let temp = TempDir::new().unwrap();
        assert_eq!(marker(&temp).read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_then_read_is_exact() {
        let temp = TempDir::new().unwrap();
        let marker = marker(&temp);

        marker.write(Version::new(1234)).unwrap();

        assert_eq!(std::fs::read_to_string(marker.path()).unwrap(), "1234");
        assert_eq!(marker.read().await.unwrap(), Some(Version::new(1234)));
    }

    #[tokio::test]
    async fn test_write_truncates_previous_content() {
        let temp = TempDir::new().unwrap();
        let marker = marker(&temp);
        std::fs::write(marker.path(), "1234567").unwrap();

        marker.write(Version::new(15)).unwrap();

        assert_eq!(std::fs::read_to_string(marker.path()).unwrap(), "15");
    }

    #[tokio::test]
    async fn test_trailing_newline_is_tolerated() {
        let temp = TempDir::new().unwrap();
        let marker = marker(&temp);
        std::fs::write(marker.path(), "1500\n").unwrap();

        assert_eq!(marker.read().await.unwrap(), Some(Version::new(1500)));
    }

    #[tokio::test]
    async fn test_surrounding_whitespace_is_stripped() {
        let temp = TempDir::new().unwrap();
        let marker = marker(&temp);
        std::fs::write(marker.path(), " 1500\r\n").unwrap();

        assert_eq!(marker.read().await.unwrap(), Some(Version::new(1500)));
        assert!(marker.path().exists());
    }

    #[tokio::test]
    async fn test_interior_whitespace_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let marker = marker(&temp);
        std::fs::write(marker.path(), "15 00").unwrap();

        assert!(matches!(marker.read().await, Err(UpdaterError::CorruptMarker { .. })));
        assert!(!marker.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_marker_is_removed() {
        let temp = TempDir::new().unwrap();
        let marker = marker(&temp);
        std::fs::write(marker.path(), "mainline-1500").unwrap();

        let err = marker.read().await.unwrap_err();

        assert!(matches!(err, UpdaterError::CorruptMarker { ref content, .. } if content == "mainline-1500"));
        assert!(!marker.path().exists());
    }

    #[tokio::test]
    async fn test_empty_marker_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let marker = marker(&temp);
        std::fs::write(marker.path(), "").unwrap();

        assert!(matches!(marker.read().await, Err(UpdaterError::CorruptMarker { .. })));
        assert!(!marker.path().exists());
    }
}
