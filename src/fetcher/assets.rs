//! Release asset extraction and selection.
//!
//! The listing page links every asset of every release. The platform asset
//! pattern picks out this platform's archives in document order, newest
//! release first. Each release publishes a debug-symbols archive next to the
//! canonical one, and upstream lists the debug build first.

use crate::config::UpdaterConfig;
use crate::core::UpdaterError;
use crate::utils::platform::ArchiveKind;
use regex::Regex;
use tracing::{debug, warn};

/// File name fragments that mark a debug-symbols build.
const DEBUG_MARKERS: &[&str] = &["debug", "pdb"];

/// A downloadable archive found on the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// Path as it appears on the page
    pub path: String,
    /// Absolute download URL
    pub url: String,
    /// Archive format inferred from the file name
    pub kind: ArchiveKind,
    /// Whether the file name marks a debug-symbols build
    pub is_debug: bool,
}

impl ReleaseAsset {
    fn new(config: &UpdaterConfig, path: &str) -> Self {
        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", config.releases_url, path)
        };

        Self {
            path: path.to_string(),
            url,
            kind: config.archive_kind_for(path),
            is_debug: is_debug_asset(path),
        }
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Every match of `pattern` in `body`, in document order.
#[must_use]
pub fn extract_asset_paths<'a>(pattern: &Regex, body: &'a str) -> Vec<&'a str> {
    pattern.find_iter(body).map(|m| m.as_str()).collect()
}

fn is_debug_asset(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path).to_ascii_lowercase();
    DEBUG_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Choose the asset to install.
///
/// At least two matches are required. The first match whose file name does
/// not mark a debug build is chosen. If every file name looks like a debug
/// build, the second match is taken, since upstream lists the debug archive
/// first.
pub fn select_asset(config: &UpdaterConfig, body: &str) -> Result<ReleaseAsset, UpdaterError> {
    let paths = extract_asset_paths(&config.asset_pattern, body);
    debug!("Found {} asset link(s) for {}", paths.len(), config.platform);

    if paths.len() < 2 {
        return Err(UpdaterError::NoAssetFound {
            pattern: config.asset_pattern.as_str().to_string(),
            found: paths.len(),
        });
    }

    let assets: Vec<ReleaseAsset> = paths.iter().map(|path| ReleaseAsset::new(config, path)).collect();

    if let Some(asset) = assets.iter().find(|asset| !asset.is_debug) {
        debug!("Selected {}", asset.file_name());
        return Ok(asset.clone());
    }

    warn!("Every asset name looks like a debug build; using the second listed asset");
    Ok(assets[1].clone())
}
