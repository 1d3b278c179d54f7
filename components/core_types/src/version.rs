//! Version triples reported by the engine and its companion library.

use serde::Serialize;
use std::fmt;

/// A `major.minor.patch` version triple.
///
/// # Examples
///
/// ```
/// use core_types::Version;
///
/// assert_eq!(Version::from_packed(108_300).to_string(), "1.83.0");
/// assert_eq!(Version::parse("11.2.214.14"), Some(Version::new(11, 2, 214)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Version {
    /// Major component
    pub major: u32,
    /// Minor component
    pub minor: u32,
    /// Patch component
    pub patch: u32,
}

impl Version {
    /// Build a version from its components
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Decode a packed `MMmmmpp` integer (`major * 100000 + minor * 100 + patch`)
    pub const fn from_packed(packed: u32) -> Self {
        Self {
            major: packed / 100_000,
            minor: (packed / 100) % 1000,
            patch: packed % 100,
        }
    }

    /// Parse an engine version string.
    ///
    /// The string is split into at most three dot-separated parts; the
    /// patch part keeps only its leading digits, so build suffixes such as
    /// `214.14` or `3-beta` are tolerated.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().splitn(3, '.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let rest = parts.next()?;
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        let patch = digits.parse().ok()?;
        Some(Self::new(major, minor, patch))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
