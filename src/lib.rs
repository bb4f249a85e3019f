//! yuzu-updater - in-place updater for yuzu mainline builds
//!
//! Checks the public release listing for a newer build, downloads the archive
//! for the current platform and merges it over an existing installation. The
//! last installed build number is recorded in a small marker file next to the
//! emulator.
//!
//! # Architecture Overview
//!
//! The update is a strictly sequential pipeline of four stages. Each stage
//! fails fast with a typed [`core::UpdaterError`], and every error maps to a
//! stable process exit code.
//!
//! 1. **Version Resolver** ([`version`]) - installed build from the marker
//!    file or the executable, latest build from the listing page
//! 2. **Update Decision** ([`decision`]) - up to date, update available, or
//!    inconsistent
//! 3. **Artifact Fetcher** ([`fetcher`]) - asset selection, running-instance
//!    check, streaming download
//! 4. **Installer** ([`installer`]) - extraction, merge-copy, marker update
//!
//! [`workflow`] wires the stages together. Network access, the process table
//! and the version probe are injected as capabilities so the pipeline runs
//! unchanged against fakes in tests.
//!
//! # Core Modules
//!
//! - [`cli`] - command-line interface
//! - [`config`] - immutable per-run configuration and the overrides file
//! - [`constants`] - fixed names, defaults and exit codes
//! - [`core`] - error types and user-facing error rendering
//! - [`utils`] - file system helpers, platform details, progress bars
//!
//! # Example
//!
//! ```rust,no_run
//! use yuzu_updater::config::UpdaterConfig;
//! use yuzu_updater::constants::CONNECT_TIMEOUT;
//! use yuzu_updater::fetcher::{HttpTransport, SystemProcesses};
//! use yuzu_updater::utils::Platform;
//! use yuzu_updater::version::ExecutableProbe;
//! use yuzu_updater::workflow::UpdateWorkflow;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = UpdaterConfig::for_platform(Platform::current(), ".".into())?;
//! let transport = HttpTransport::new(&config.user_agent, CONNECT_TIMEOUT)?;
//! let workflow = UpdateWorkflow::new(
//!     &config,
//!     &transport,
//!     &SystemProcesses,
//!     &ExecutableProbe,
//!     CancellationToken::new(),
//! );
//!
//! let outcome = workflow.run(|progress| {
//!     println!("{} / {:?} bytes", progress.downloaded, progress.total);
//! }).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;

// Pipeline stages
pub mod decision;
pub mod fetcher;
pub mod installer;
pub mod version;
pub mod workflow;

// Supporting modules
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
