//! Platform detection and platform-specific naming.
//!
//! Everything that differs between Windows and Linux builds of the emulator
//! is answered here: the executable name, the release asset pattern, the
//! archive format, and how running processes are matched by name. The
//! values are consumed once when [`crate::config::UpdaterConfig`] is built.

use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Gets the home directory path for the current user.
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let platform_help = if is_windows() {
            "On Windows: Check that the USERPROFILE environment variable is set"
        } else {
            "On Unix/Linux: Check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// Prefix a long Windows path with `\\?\` so file APIs accept it.
#[cfg(windows)]
pub fn windows_long_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    if path_str.len() > 260 && !path_str.starts_with(r"\\?\") {
        let absolute_path = if path.is_relative() {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(path)
        } else {
            path.to_path_buf()
        };

        let absolute_str = absolute_path.to_string_lossy();
        if absolute_str.len() > 260 {
            if let Some(stripped) = absolute_str.strip_prefix(r"\\") {
                PathBuf::from(format!(r"\\?\UNC\{}", stripped))
            } else {
                PathBuf::from(format!(r"\\?\{}", absolute_str))
            }
        } else {
            absolute_path
        }
    } else {
        path.to_path_buf()
    }
}

/// No-op on platforms without the 260-character path limit.
#[cfg(not(windows))]
#[must_use]
pub fn windows_long_path(path: &Path) -> PathBuf {
    path.to_path_buf()
}

/// Archive formats the upstream project publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// `.zip` (Windows MSVC builds)
    Zip,
    /// `.tar.gz` / `.tgz` (Linux builds)
    TarGz,
    /// `.tar.xz` / `.txz` (Linux builds)
    TarXz,
}

impl ArchiveKind {
    /// Infer the archive kind from an asset file name or URL.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".zip") {
            Some(Self::Zip)
        } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if lower.ends_with(".tar.xz") || lower.ends_with(".txz") {
            Some(Self::TarXz)
        } else {
            None
        }
    }

    /// File extension used for the local download.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
            Self::TarXz => "tar.xz",
        }
    }
}

/// How a running process name is compared to the emulator executable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMatch {
    /// Case-insensitive equality.
    Exact,
    /// Case-insensitive substring (Windows reports names such as `yuzu.exe`
    /// and `yuzu-cmd.exe` for the same installation).
    Substring,
}

impl ProcessMatch {
    /// Whether a reported process name matches the executable name.
    #[must_use]
    pub fn matches(self, process_name: &str, executable_name: &str) -> bool {
        let process = process_name.to_lowercase();
        let executable = executable_name.to_lowercase();
        match self {
            Self::Exact => process == executable,
            Self::Substring => {
                let stem = executable.strip_suffix(".exe").unwrap_or(&executable);
                process.contains(stem)
            }
        }
    }
}

/// Supported host platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Windows, MSVC builds distributed as zip archives
    Windows,
    /// Linux, builds distributed as tar archives
    Linux,
}

impl Platform {
    /// Platform the updater was compiled for.
    ///
    /// Every non-Windows target uses the Linux layout.
    #[must_use]
    pub const fn current() -> Self {
        if is_windows() {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    /// File name of the emulator executable inside the installation root.
    #[must_use]
    pub const fn executable_name(self) -> &'static str {
        match self {
            Self::Windows => "yuzu.exe",
            Self::Linux => "yuzu",
        }
    }

    /// Default pattern for release asset links on the listing page.
    #[must_use]
    pub const fn asset_pattern(self) -> &'static str {
        match self {
            Self::Windows => r#"/download/mainline[^\s"'<>]*?/yuzu-windows-msvc-[^\s"'<>]*?\.zip"#,
            Self::Linux => r#"/download/mainline[^\s"'<>]*?/yuzu-linux-[^\s"'<>]*?\.tar\.(?:gz|xz)"#,
        }
    }

    /// Archive format of this platform's assets.
    #[must_use]
    pub const fn archive_kind(self) -> ArchiveKind {
        match self {
            Self::Windows => ArchiveKind::Zip,
            Self::Linux => ArchiveKind::TarGz,
        }
    }

    /// Fixed local file name the asset is downloaded to.
    #[must_use]
    pub fn archive_file_name(self) -> String {
        format!("yuzu_latest.{}", self.archive_kind().extension())
    }

    /// Process-name matching rule for the running-instance check.
    #[must_use]
    pub const fn process_match(self) -> ProcessMatch {
        match self {
            Self::Windows => ProcessMatch::Substring,
            Self::Linux => ProcessMatch::Exact,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Linux => write!(f, "linux"),
        }
    }
}
