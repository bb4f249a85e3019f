//! Artifact Fetcher stage.
//!
//! Locates the platform asset on the release listing page, makes sure the
//! emulator is not running, and streams the archive to disk.
//!
//! # Module Organization
//!
//! - [`assets`] - asset link extraction and selection
//! - [`process`] - running-instance detection
//! - [`transport`] - HTTP access behind the [`Transport`] capability
//! - [`download`] - streaming download with progress and cancellation

pub mod assets;
pub mod download;
pub mod process;
pub mod transport;

pub use assets::{ReleaseAsset, extract_asset_paths, select_asset};
pub use download::{DownloadProgress, download_to_file};
pub use process::{ProcessInfo, ProcessInspector, SystemProcesses, ensure_no_running_instance};
pub use transport::{HttpTransport, ResponseBody, Transport};
