//! Installed-version probe.
//!
//! Without a marker file, the local version comes from the installed
//! executable itself: it is run with `--version` and its output is searched
//! for the build string (`mainline-0-1234-gdeadbeef`, or the shorter
//! `mainline-1234-gdeadbeef`). The probe sits behind [`VersionProbe`] so the
//! workflow can be exercised without a real emulator binary.

use super::Version;
use crate::config::UpdaterConfig;
use crate::core::UpdaterError;
use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tracing::debug;

/// Capability for discovering the installed build without a marker file.
#[async_trait]
pub trait VersionProbe: Send + Sync {
    async fn probe(&self, config: &UpdaterConfig) -> Result<Version, UpdaterError>;
}

/// Runs the installed executable with the configured version flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutableProbe;

#[async_trait]
impl VersionProbe for ExecutableProbe {
    async fn probe(&self, config: &UpdaterConfig) -> Result<Version, UpdaterError> {
        let executable = config.executable_path();
        let failed = |reason: String| UpdaterError::VersionProbeFailed {
            executable: executable.display().to_string(),
            reason,
        };

        debug!("Probing {} {}", executable.display(), config.version_flag);
        let output = Command::new(&executable)
            .arg(&config.version_flag)
            .current_dir(&config.install_root)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| failed(format!("failed to run: {e}")))?;

        // Some builds print the version banner on stderr.
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push('\n');
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        parse_probe_output(&config.probe_pattern, &text).ok_or_else(|| {
            failed(format!("output did not match {:?}", config.probe_pattern.as_str()))
        })
    }
}

/// Extract the build number from version output using the first capture
/// group of `pattern`.
#[must_use]
pub fn parse_probe_output(pattern: &Regex, output: &str) -> Option<Version> {
    pattern
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Version::parse(m.as_str()))
}
