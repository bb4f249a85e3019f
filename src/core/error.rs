//! Error handling for the updater
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors**: every stage fails with one [`UpdaterError`]
//!    variant, and each variant maps to a stable process exit code.
//! 2. **User-friendly messages**: [`user_friendly_error`] turns any error into
//!    an [`ErrorContext`] with details and an actionable suggestion.
//!
//! # Error Categories
//!
//! - **Version resolution**: [`UpdaterError::VersionProbeFailed`],
//!   [`UpdaterError::CorruptMarker`], [`UpdaterError::RemoteFetchFailed`],
//!   [`UpdaterError::RemoteParseFailed`]
//! - **Decision**: [`UpdaterError::Inconsistent`]
//! - **Fetching**: [`UpdaterError::NoAssetFound`], [`UpdaterError::InstanceRunning`],
//!   [`UpdaterError::DownloadFailed`]
//! - **Installation**: [`UpdaterError::InstallError`]
//! - **Ambient**: [`UpdaterError::Cancelled`], [`UpdaterError::ConfigError`],
//!   [`UpdaterError::Other`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use yuzu_updater::core::{UpdaterError, user_friendly_error};
//!
//! let error = UpdaterError::InstanceRunning {
//!     name: "yuzu.exe".to_string(),
//!     pid: 4242,
//! };
//! let code = error.exit_code();
//! user_friendly_error(anyhow::Error::from(error)).display();
//! std::process::exit(code);
//! ```

use crate::constants::exit_code;
use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for update operations.
///
/// Each variant is one failure mode of the update workflow. Variants carry
/// plain strings so the error can be cloned, logged and rendered without
/// holding on to I/O handles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdaterError {
    /// The installed version could not be determined by running the executable.
    #[error("Could not determine the installed version from {executable}: {reason}")]
    VersionProbeFailed {
        /// Executable that was probed
        executable: String,
        /// Why the probe failed (spawn error or unmatched output)
        reason: String,
    },

    /// The version marker file exists but does not hold a plain number.
    ///
    /// The file has already been removed when this error is returned, so the
    /// next run falls back to probing the executable.
    #[error("Version marker {path} is corrupt (content: {content:?})")]
    CorruptMarker {
        /// Path of the marker file
        path: String,
        /// The offending content, trimmed for display
        content: String,
    },

    /// The releases listing page could not be fetched.
    #[error("Failed to fetch the release listing from {url}: {reason}")]
    RemoteFetchFailed {
        /// URL of the listing page
        url: String,
        /// Network or HTTP status failure
        reason: String,
    },

    /// The releases listing page did not contain a recognizable version.
    #[error("No release version matching {pattern:?} found at {url}")]
    RemoteParseFailed {
        /// URL of the listing page
        url: String,
        /// Pattern that failed to match
        pattern: String,
    },

    /// Fewer than two assets for this platform were listed.
    #[error("No downloadable asset matching {pattern:?} (found {found} match(es), need at least 2)")]
    NoAssetFound {
        /// Platform asset pattern
        pattern: String,
        /// Number of matches found
        found: usize,
    },

    /// The emulator is running and would lock files during replacement.
    #[error("{name} is running (pid {pid}); close it before updating")]
    InstanceRunning {
        /// Process name as reported by the OS
        name: String,
        /// Process id of the conflicting instance
        pid: u32,
    },

    /// The asset download failed part-way or never started.
    #[error("Failed to download {url}: {reason}")]
    DownloadFailed {
        /// Asset URL
        url: String,
        /// Network or filesystem failure
        reason: String,
    },

    /// Extraction, copy or marker persistence failed.
    #[error("Installation failed while {operation} ({path}): {reason}")]
    InstallError {
        /// Installer step that failed (e.g. "extracting archive")
        operation: String,
        /// Path involved in the failure
        path: String,
        /// Underlying error text
        reason: String,
    },

    /// The installed build is newer than anything published.
    #[error("Installed version {local} is newer than the latest published version {remote}")]
    Inconsistent {
        /// Locally installed build number
        local: u32,
        /// Latest remote build number
        remote: u32,
    },

    /// The user interrupted the run.
    #[error("Update cancelled")]
    Cancelled,

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Any other failure.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl UpdaterError {
    /// Process exit code for this error.
    ///
    /// See [`crate::constants::exit_code`] for the table.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InstanceRunning { .. } => exit_code::INSTANCE_RUNNING,
            Self::CorruptMarker { .. } => exit_code::CORRUPT_MARKER,
            Self::VersionProbeFailed { .. } | Self::RemoteParseFailed { .. } => {
                exit_code::VERSION_PARSE
            }
            Self::Inconsistent { .. } => exit_code::LOCAL_NEWER,
            Self::Cancelled => exit_code::CANCELLED,
            Self::RemoteFetchFailed { .. }
            | Self::NoAssetFound { .. }
            | Self::DownloadFailed { .. }
            | Self::InstallError { .. }
            | Self::ConfigError { .. }
            | Self::Other { .. } => exit_code::FAILURE,
        }
    }

    /// Shorthand for an [`UpdaterError::InstallError`] built from any error.
    pub fn install(
        operation: impl Into<String>,
        path: &std::path::Path,
        reason: impl fmt::Display,
    ) -> Self {
        Self::InstallError {
            operation: operation.into(),
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Exit code for an arbitrary error chain.
///
/// Looks for an [`UpdaterError`] anywhere in the chain; anything else is a
/// generic failure.
#[must_use]
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<UpdaterError>())
        .map_or(exit_code::FAILURE, UpdaterError::exit_code)
}

/// Error wrapper with user-facing details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: UpdaterError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: UpdaterError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Recognizes [`UpdaterError`] anywhere in the chain and attaches tailored
/// suggestions; I/O permission errors get a permission hint; everything else
/// is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(updater_error) =
        error.chain().find_map(|cause| cause.downcast_ref::<UpdaterError>())
    {
        return create_error_context(updater_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::PermissionDenied
    {
        return ErrorContext::new(UpdaterError::Other {
            message: io_error.to_string(),
        })
        .with_suggestion(
            "Run the updater from a directory you can write to, or with elevated permissions",
        );
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(UpdaterError::Other {
        message,
    })
}

fn create_error_context(error: UpdaterError) -> ErrorContext {
    match &error {
        UpdaterError::VersionProbeFailed { .. } => ErrorContext::new(error)
            .with_details("No version marker exists yet, so the installed executable was asked for its build number")
            .with_suggestion("Run the updater from the yuzu installation directory, or pass --dir"),
        UpdaterError::CorruptMarker { .. } => ErrorContext::new(error)
            .with_details("The marker has been removed; the next run will probe the installed executable instead")
            .with_suggestion("Run the updater again"),
        UpdaterError::RemoteFetchFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Check your network connection, or raise the timeout with --timeout"),
        UpdaterError::RemoteParseFailed { .. } | UpdaterError::NoAssetFound { .. } => {
            ErrorContext::new(error)
                .with_details("The release listing page is scanned with text patterns; its layout may have changed")
                .with_suggestion("Override the pattern in the config file, or update the updater")
        }
        UpdaterError::InstanceRunning { .. } => ErrorContext::new(error)
            .with_suggestion("Close yuzu and run the updater again"),
        UpdaterError::DownloadFailed { .. } => ErrorContext::new(error)
            .with_details("The partially downloaded archive has been discarded")
            .with_suggestion("Run the updater again"),
        UpdaterError::InstallError { .. } => ErrorContext::new(error)
            .with_details("The version marker was not updated; some files may already have been replaced")
            .with_suggestion("Check free disk space and permissions, then run the updater again"),
        UpdaterError::Inconsistent { .. } => ErrorContext::new(error)
            .with_details("The marker file or installed build does not correspond to a published release")
            .with_suggestion("Delete the version marker file if this installation was built locally"),
        UpdaterError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Fix or remove the configuration file"),
        UpdaterError::Cancelled | UpdaterError::Other { .. } => ErrorContext::new(error),
    }
}
