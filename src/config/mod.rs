//! Updater configuration.
//!
//! [`UpdaterConfig`] gathers every value the workflow needs: where the
//! release listing lives, the patterns used to read it, which executable and
//! process belong to the emulator, and where files go on disk. It is built
//! once at startup from the detected [`Platform`], optionally adjusted by a
//! [`FileConfig`] overrides file, and then passed by reference to every
//! stage. Nothing mutates it afterwards.
//!
//! # Examples
//!
//! ```rust,no_run
//! use yuzu_updater::config::UpdaterConfig;
//! use yuzu_updater::utils::Platform;
//!
//! # fn example() -> Result<(), yuzu_updater::core::UpdaterError> {
//! let config = UpdaterConfig::for_platform(Platform::current(), ".".into())?;
//! println!("Marker file: {}", config.marker_path().display());
//! # Ok(())
//! # }
//! ```

pub mod overrides;

pub use overrides::FileConfig;

use crate::constants;
use crate::core::UpdaterError;
use crate::utils::platform::{ArchiveKind, Platform, ProcessMatch};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Immutable configuration for one updater run.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Platform the configuration was built for
    pub platform: Platform,
    /// Installation directory that is read and updated in place
    pub install_root: PathBuf,
    /// Releases listing page; asset paths are appended to it
    pub releases_url: String,
    /// Product name in release titles
    pub product_name: String,
    /// Emulator executable file name
    pub executable_name: String,
    /// Rule for matching running processes against `executable_name`
    pub process_match: ProcessMatch,
    /// Fixed file name of the downloaded archive
    pub archive_file_name: String,
    /// Version marker file name
    pub marker_file_name: String,
    /// Flag that makes the executable print its version
    pub version_flag: String,
    /// Matches this platform's asset paths on the listing page
    pub asset_pattern: Regex,
    /// Captures the latest build number on the listing page
    pub remote_version_pattern: Regex,
    /// Captures the build number in the executable's version output
    pub probe_pattern: Regex,
    /// Timeout for the listing request
    pub request_timeout: Duration,
    /// User-Agent header for all requests
    pub user_agent: String,
    /// Extensions of leftover compression files removed after install
    pub sidecar_extensions: Vec<String>,
}

impl UpdaterConfig {
    /// Build the default configuration for `platform`, updating `install_root`.
    pub fn for_platform(platform: Platform, install_root: PathBuf) -> Result<Self, UpdaterError> {
        Ok(Self {
            platform,
            install_root,
            releases_url: constants::RELEASES_URL.to_string(),
            product_name: constants::PRODUCT_NAME.to_string(),
            executable_name: platform.executable_name().to_string(),
            process_match: platform.process_match(),
            archive_file_name: platform.archive_file_name(),
            marker_file_name: constants::MARKER_FILE.to_string(),
            version_flag: constants::VERSION_FLAG.to_string(),
            asset_pattern: compile("asset pattern", platform.asset_pattern())?,
            remote_version_pattern: remote_version_regex(constants::PRODUCT_NAME)?,
            probe_pattern: compile("version probe pattern", constants::VERSION_PROBE_PATTERN)?,
            request_timeout: constants::DEFAULT_REQUEST_TIMEOUT,
            user_agent: format!("yuzu-updater/{}", env!("CARGO_PKG_VERSION")),
            sidecar_extensions: constants::SIDECAR_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
        })
    }

    /// Apply values from an overrides file.
    ///
    /// Patterns are recompiled, so an invalid override fails here rather
    /// than halfway through an update.
    pub fn with_overrides(mut self, overrides: FileConfig) -> Result<Self, UpdaterError> {
        if let Some(url) = overrides.releases_url {
            self.releases_url = url.trim_end_matches('/').to_string();
        }
        if let Some(product) = overrides.product_name {
            self.remote_version_pattern = remote_version_regex(&product)?;
            self.product_name = product;
        }
        if let Some(pattern) = overrides.asset_pattern {
            self.asset_pattern = compile("asset pattern", &pattern)?;
        }
        if let Some(secs) = overrides.timeout_secs {
            self = self.with_timeout(Duration::from_secs(secs))?;
        }
        if let Some(user_agent) = overrides.user_agent {
            self.user_agent = user_agent;
        }
        Ok(self)
    }

    /// Replace the listing request timeout. Zero is rejected.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, UpdaterError> {
        if timeout.is_zero() {
            return Err(UpdaterError::ConfigError {
                message: "timeout must be greater than zero".to_string(),
            });
        }
        self.request_timeout = timeout;
        Ok(self)
    }

    /// Path of the version marker file.
    #[must_use]
    pub fn marker_path(&self) -> PathBuf {
        self.install_root.join(&self.marker_file_name)
    }

    /// Path the asset is downloaded to.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.install_root.join(&self.archive_file_name)
    }

    /// Path of the installed emulator executable.
    #[must_use]
    pub fn executable_path(&self) -> PathBuf {
        self.install_root.join(&self.executable_name)
    }

    /// Archive format for a selected asset, falling back to the platform's.
    #[must_use]
    pub fn archive_kind_for(&self, asset_path: &str) -> ArchiveKind {
        ArchiveKind::from_file_name(asset_path).unwrap_or(self.platform.archive_kind())
    }

    /// Whether `path` is a compression leftover that should be removed.
    #[must_use]
    pub fn is_sidecar(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.sidecar_extensions.iter().any(|s| s.eq_ignore_ascii_case(ext)))
    }
}

fn compile(what: &str, pattern: &str) -> Result<Regex, UpdaterError> {
    Regex::new(pattern).map_err(|e| UpdaterError::ConfigError {
        message: format!("invalid {what} {pattern:?}: {e}"),
    })
}

fn remote_version_regex(product: &str) -> Result<Regex, UpdaterError> {
    compile(
        "remote version pattern",
        &format!(r"{} (\d{{3,4}})\b", regex::escape(product)),
    )
}
