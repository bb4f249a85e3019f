//! Core types shared by every stage of the updater.
//!
//! - [`error`] - the [`UpdaterError`] taxonomy, exit codes and user-facing
//!   error rendering

pub mod error;

pub use error::{ErrorContext, UpdaterError, exit_code_for, user_friendly_error};
