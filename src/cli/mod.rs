//! Command-line interface for the updater.
//!
//! The updater has a single command. By default it runs the whole workflow in
//! the current directory:
//!
//! ```bash
//! yuzu-updater                        # update the installation in .
//! yuzu-updater --dir "C:\Games\yuzu"  # update another installation
//! yuzu-updater --check                # report only, never download
//! yuzu-updater --no-progress -q       # scripted use
//! ```
//!
//! # Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0    | Up to date, update available (`--check`), or update installed |
//! | 1    | Network, download, install or configuration failure |
//! | 2    | Invalid command-line usage |
//! | 3    | yuzu is running |
//! | 4    | Corrupt version marker (removed; run again) |
//! | 5    | A version could not be parsed |
//! | 6    | Installed build is newer than the latest published build |
//! | 130  | Interrupted |
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - log filter, overrides `--verbose` and `--quiet`
//! - `YUZU_UPDATER_CONFIG` - overrides file location
//! - `YUZU_UPDATER_NO_PROGRESS` - hide progress bars

pub mod update;

use crate::config::{FileConfig, UpdaterConfig};
use crate::constants::CONNECT_TIMEOUT;
use crate::core::UpdaterError;
use crate::fetcher::{HttpTransport, SystemProcesses};
use crate::utils::Platform;
use crate::version::ExecutableProbe;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub use update::UpdateOptions;

/// Keep a yuzu mainline installation up to date.
#[derive(Parser, Debug)]
#[command(
    name = "yuzu-updater",
    about = "Update a yuzu mainline installation in place",
    version,
    long_about = "Checks the yuzu mainline release listing for a newer build, downloads the \
                  archive for this platform and copies it over the installation directory."
)]
pub struct Cli {
    /// Installation directory to update.
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    dir: PathBuf,

    /// Only report whether an update is available; never download.
    #[arg(long)]
    check: bool,

    /// Disable progress bars.
    ///
    /// Also enabled by setting `YUZU_UPDATER_NO_PROGRESS`.
    #[arg(long)]
    no_progress: bool,

    /// Timeout for the release listing request, in seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Path to an overrides file.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Log filter selected by the verbosity flags.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over the verbosity flags.
    pub fn init_logging(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.log_level()));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Options for the update command derived from the flags.
    #[must_use]
    pub const fn build_options(&self) -> UpdateOptions {
        UpdateOptions {
            check_only: self.check,
            no_progress: self.no_progress,
            quiet: self.quiet,
        }
    }

    /// Build the configuration and run the update against the real network,
    /// process table and executable.
    pub async fn execute(self, cancel: CancellationToken) -> Result<()> {
        let config = self.build_config().await?;
        debug!("Using configuration: {config:?}");

        let transport = HttpTransport::new(&config.user_agent, CONNECT_TIMEOUT)?;
        update::execute(
            &config,
            &transport,
            &SystemProcesses,
            &ExecutableProbe,
            self.build_options(),
            cancel,
        )
        .await
    }

    /// Platform defaults, then the overrides file, then command-line flags.
    pub async fn build_config(&self) -> Result<UpdaterConfig> {
        if !self.dir.is_dir() {
            return Err(UpdaterError::ConfigError {
                message: format!("installation directory {} does not exist", self.dir.display()),
            }
            .into());
        }
        let install_root = std::path::absolute(&self.dir)?;

        let overrides = FileConfig::load(self.config.as_deref()).await.map_err(|e| {
            UpdaterError::ConfigError {
                message: format!("{e:#}"),
            }
        })?;

        let mut config =
            UpdaterConfig::for_platform(Platform::current(), install_root)?.with_overrides(overrides)?;
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs))?;
        }

        Ok(config)
    }
}
