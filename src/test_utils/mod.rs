//! Test utilities for the updater
//!
//! Fakes for the three capabilities the workflow depends on, archive builders,
//! and a logging helper. Available to unit tests and, through the
//! `test-utils` feature, to the integration suite.
//!
//! # Example
//!
//! ```rust,no_run
//! use yuzu_updater::test_utils::{FakeProbe, FakeProcesses, FakeTransport};
//!
//! let transport = FakeTransport::new("<h2>yuzu 1500</h2>");
//! let probe = FakeProbe::version(1234);
//! let processes = FakeProcesses::default();
//! ```

pub mod archives;
pub mod fakes;

pub use fakes::{FakeProbe, FakeProcesses, FakeTransport};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=yuzu_updater=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Listing page with one release title and the given asset links.
pub fn listing_page(version: u32, asset_paths: &[&str]) -> String {
    let mut page = format!(
        "<html><body>\n<h2 class=\"sr-only\">yuzu {version}</h2>\n<a href=\"/yuzu-emu/yuzu-mainline/releases/tag/mainline-0-{version}\">yuzu {version}</a>\n"
    );
    for path in asset_paths {
        page.push_str(&format!(
            "<a href=\"/yuzu-emu/yuzu-mainline/releases{path}\" rel=\"nofollow\">asset</a>\n"
        ));
    }
    page.push_str("</body></html>\n");
    page
}
