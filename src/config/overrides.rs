//! Optional user overrides file.
//!
//! The updater works without any configuration file. When upstream moves or
//! changes its page layout, a small TOML file lets the user point the updater
//! elsewhere without a new release:
//!
//! ```toml
//! releases_url = "https://example.org/yuzu/releases"
//! product_name = "yuzu"
//! asset_pattern = '/download/mainline[^"]*?/yuzu-windows-msvc-[^"]*?\.zip'
//! timeout_secs = 30
//! user_agent = "my-updater/1.0"
//! ```
//!
//! # File Location
//!
//! 1. The path given with `--config`
//! 2. The `YUZU_UPDATER_CONFIG` environment variable
//! 3. `~/.yuzu-updater/config.toml` (`%LOCALAPPDATA%\yuzu-updater\config.toml` on Windows)
//!
//! A missing file at the default location is not an error. A missing file at
//! an explicitly requested location is.

use crate::constants::CONFIG_PATH_ENV;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Values read from the overrides file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Releases listing page URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub releases_url: Option<String>,

    /// Product name used to find the release version on the listing page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    /// Regular expression matching this platform's asset links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_pattern: Option<String>,

    /// Listing request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl FileConfig {
    /// Load overrides following the lookup order in the module docs.
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path).await;
        }

        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Self::load_from(Path::new(&path)).await;
        }

        match Self::default_path() {
            Ok(path) if path.exists() => Self::load_from(&path).await,
            Ok(path) => {
                debug!("No overrides file at {}", path.display());
                Ok(Self::default())
            }
            Err(e) => {
                debug!("Skipping overrides file: {e}");
                Ok(Self::default())
            }
        }
    }

    /// Read and parse a specific overrides file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Default overrides file location.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("yuzu-updater")
        } else {
            crate::utils::platform::get_home_dir()?.join(".yuzu-updater")
        };

        Ok(config_dir.join("config.toml"))
    }
}
