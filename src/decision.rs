//! Update Decision stage.

use crate::version::Version;
use std::fmt;

/// Outcome of comparing the installed build with the latest published one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateDecision {
    /// Installed build equals the latest; nothing to download.
    UpToDate,
    /// A newer build is published.
    UpdateAvailable,
    /// The installed build is newer than anything published. This points at a
    /// broken marker or a local build and is reported as a failure.
    Inconsistent,
}

/// Compare two build numbers.
#[must_use]
pub fn decide(local: Version, remote: Version) -> UpdateDecision {
    match local.cmp(&remote) {
        std::cmp::Ordering::Less => UpdateDecision::UpdateAvailable,
        std::cmp::Ordering::Equal => UpdateDecision::UpToDate,
        std::cmp::Ordering::Greater => UpdateDecision::Inconsistent,
    }
}

impl fmt::Display for UpdateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UpToDate => "up to date",
            Self::UpdateAvailable => "update available",
            Self::Inconsistent => "inconsistent",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_total_order() {
        let samples = [0, 1, 99, 100, 999, 1234, 1500, 9999, u32::MAX];
        for &a in &samples {
            for &b in &samples {
                let expected = if a < b {
                    UpdateDecision::UpdateAvailable
                } else if a == b {
                    UpdateDecision::UpToDate
                } else {
                    UpdateDecision::Inconsistent
                };
                assert_eq!(decide(Version::new(a), Version::new(b)), expected, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_local_newer_is_inconsistent() {
        assert_eq!(decide(Version::new(1600), Version::new(1500)), UpdateDecision::Inconsistent);
    }
}
