//! Global constants used throughout the updater.
//!
//! Fixed file names, upstream locations, timeouts and the process exit codes
//! that make up the updater's external contract. Platform-dependent values
//! live in [`crate::utils::platform`].

use std::time::Duration;

/// Releases listing page scanned for versions and asset links.
pub const RELEASES_URL: &str = "https://github.com/yuzu-emu/yuzu-mainline/releases";

/// Product name as it appears in release titles (`"yuzu 1234"`).
pub const PRODUCT_NAME: &str = "yuzu";

/// Marker file recording the last successfully installed build number.
pub const MARKER_FILE: &str = "yuzu_version.txt";

/// Flag passed to the installed executable to print its build string.
pub const VERSION_FLAG: &str = "--version";

/// Pattern applied to the executable's `--version` output.
///
/// Accepts both `mainline-0-1234-<hash>` and `mainline-1234-<hash>`; the
/// first capture group is the build number, never the leading channel digit.
pub const VERSION_PROBE_PATTERN: &str = r"mainline-(?:\d+-)?(\d+)-";

/// Default timeout for the releases listing request (10 seconds).
///
/// Long enough for slow links; the page is a single static document.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect timeout used for both the listing request and the download.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Extensions of compression leftovers removed from the installation root.
pub const SIDECAR_EXTENSIONS: &[&str] = &["xz"];

/// Environment variable pointing at an overrides file.
pub const CONFIG_PATH_ENV: &str = "YUZU_UPDATER_CONFIG";

/// Environment variable that hides progress bars when set.
pub const NO_PROGRESS_ENV: &str = "YUZU_UPDATER_NO_PROGRESS";

/// Process exit codes.
///
/// These values are stable across releases; scripts may rely on them.
pub mod exit_code {
    /// Up to date, or the update was installed.
    pub const SUCCESS: i32 = 0;
    /// Any failure without a more specific code (network, download, install).
    pub const FAILURE: i32 = 1;
    /// The emulator is running and its files cannot be replaced.
    pub const INSTANCE_RUNNING: i32 = 3;
    /// The version marker file held something other than digits.
    pub const CORRUPT_MARKER: i32 = 4;
    /// A version could not be parsed, locally or from the listing page.
    pub const VERSION_PARSE: i32 = 5;
    /// The installed build is newer than the newest published build.
    pub const LOCAL_NEWER: i32 = 6;
    /// The run was interrupted by the user.
    pub const CANCELLED: i32 = 130;
}
