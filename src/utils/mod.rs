//! Cross-platform utilities and helpers
//!
//! # Modules
//!
//! - [`fs`] - Directory handling, merge-copy and atomic writes
//! - [`platform`] - Platform detection and platform-specific names
//! - [`progress`] - Progress bars and spinners for long-running operations

pub mod fs;
pub mod platform;
pub mod progress;

pub use fs::{atomic_write, ensure_dir, merge_copy, remove_dir_all};
pub use platform::{ArchiveKind, Platform, ProcessMatch, is_windows};
pub use progress::ProgressBar;
