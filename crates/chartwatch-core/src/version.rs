//! Permissive version comparison
//!
//! Chart versions in the wild are not always valid semver (`v1.2`, `2.0.0-rc.1+build`,
//! `1.2.3.4`). Only the leading numeric `major.minor.patch` triple takes part in
//! comparisons; anything unparseable reads as `0.0.0`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// No catalog entry matched the release
pub const UNKNOWN: &str = "unknown";

/// Chart is internal to the platform and not published anywhere
pub const INTERNAL: &str = "internal";

/// Chart lifecycle is owned by the platform
pub const MANAGED: &str = "managed";

/// Leading `digits(.digits)?(.digits)?`, ASCII digits only
static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)(?:\.([0-9]+))?(?:\.([0-9]+))?").expect("valid regex"));

/// A `major.minor.patch` triple, ordered lexicographically
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a loosely formatted version string.
    ///
    /// One leading `v`/`V` is stripped. Missing components are zero, trailing
    /// text after the triple is ignored, and input that does not start with a
    /// digit yields `0.0.0`.
    pub fn parse(input: &str) -> Self {
        let cleaned = input
            .strip_prefix('v')
            .or_else(|| input.strip_prefix('V'))
            .unwrap_or(input);

        let Some(captures) = VERSION_PATTERN.captures(cleaned) else {
            return Self::default();
        };

        let component = |index: usize| {
            captures
                .get(index)
                .and_then(|m| m.as_str().parse::<u64>().ok())
                .unwrap_or(0)
        };

        Self::new(component(1), component(2), component(3))
    }
}

impl From<(u64, u64, u64)> for Version {
    fn from((major, minor, patch): (u64, u64, u64)) -> Self {
        Self::new(major, minor, patch)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Check whether a string is one of the placeholder "latest version" values
pub fn is_sentinel(version: &str) -> bool {
    matches!(version, UNKNOWN | INTERNAL | MANAGED)
}

/// Returns true if `candidate` is strictly newer than `current`.
///
/// Sentinel candidates (`unknown`, `internal`, `managed`) are never newer.
pub fn is_newer(current: &str, candidate: &str) -> bool {
    if is_sentinel(candidate) {
        return false;
    }
    Version::parse(candidate) > Version::parse(current)
}

/// Three-way comparison of two version strings by their parsed triples
pub fn compare(a: &str, b: &str) -> Ordering {
    Version::parse(a).cmp(&Version::parse(b))
}
