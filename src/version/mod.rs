//! Build numbers and version resolution.
//!
//! yuzu mainline builds are identified by a plain integer build number
//! (`yuzu 1500`, `mainline-0-1500-...`). There is no semantic versioning and
//! no pre-release ordering: [`Version`] is a total order on integers.
//!
//! # Module Organization
//!
//! - [`marker`] - the `yuzu_version.txt` marker file
//! - [`probe`] - asking the installed executable for its build number
//! - [`remote`] - reading the latest build number from the release listing
//! - [`resolver`] - combining the above into `(local, remote)`

pub mod marker;
pub mod probe;
pub mod remote;
pub mod resolver;

pub use marker::MarkerFile;
pub use probe::{ExecutableProbe, VersionProbe, parse_probe_output};
pub use remote::parse_remote_version;
pub use resolver::{ResolvedVersions, VersionResolver};

use std::fmt;

/// An integer build number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u32);

impl Version {
    /// Wrap a build number.
    #[must_use]
    pub const fn new(build: u32) -> Self {
        Self(build)
    }

    /// Parse a string made only of ASCII digits.
    ///
    /// Signs, whitespace, separators and values that overflow `u32` are
    /// rejected; a value that fails to parse is never defaulted.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok().map(Self)
    }

    /// The raw build number.
    #[must_use]
    pub const fn build(self) -> u32 {
        self.0
    }
}

impl From<u32> for Version {
    fn from(build: u32) -> Self {
        Self(build)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_digits() {
        assert_eq!(Version::parse("1234"), Some(Version::new(1234)));
        assert_eq!(Version::parse("0"), Some(Version::new(0)));
        assert_eq!(Version::parse("007"), Some(Version::new(7)));
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        for input in ["", " 1234", "1234\n", "-1", "+5", "12a4", "1.5", "abc"] {
            assert_eq!(Version::parse(input), None, "input {input:?}");
        }
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert_eq!(Version::parse("99999999999"), None);
    }

    #[test]
    fn test_display_has_no_padding() {
        assert_eq!(Version::new(1500).to_string(), "1500");
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert!(Version::new(999) < Version::new(1000));
        assert!(Version::parse("0999").unwrap() < Version::new(1000));
    }
}
