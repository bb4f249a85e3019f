//! File system helpers used by the installer and the marker file.
//!
//! - [`dirs`] - directory creation, merge-copy and removal
//! - [`atomic`] - temp-and-rename writes

pub mod atomic;
pub mod dirs;

pub use atomic::atomic_write;
pub use dirs::{ensure_dir, ensure_parent_dir, merge_copy, remove_dir_all, remove_file_if_exists};
