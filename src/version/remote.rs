//! Latest published build from the release listing page.

use super::Version;
use regex::Regex;

/// First build number captured by `pattern` in the listing `body`.
///
/// The listing is ordered newest first, so the first match is the latest
/// release. A match whose capture is not a valid number is skipped.
#[must_use]
pub fn parse_remote_version(pattern: &Regex, body: &str) -> Option<Version> {
    pattern
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| Version::parse(m.as_str()))
}
