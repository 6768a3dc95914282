//! Version types used for idempotency decisions.
//!
//! `FrameworkVersion` orders `.NET` versions such as `3.5`, `4.5.2` or `4.8`.
//! It is backed by `semver::Version`: missing trailing segments are zero, so
//! `4.5` equals `4.5.0` and sorts below `4.5.1`. Pre-release or build
//! suffixes and more than three segments are rejected rather than guessed.
//!
//! `NtVersion` is the Windows kernel version (`6.1` for 2008 R2/7, `6.2` for
//! 2012/8, `6.3` for 2012 R2/8.1, `10.0` for 2016 and later).

use crate::schemas::errors::{FrameworkError, Result};
use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A `.NET` framework version with numeric ordering.
#[derive(Debug, Clone)]
pub struct FrameworkVersion {
    raw: String,
    parsed: semver::Version,
}

impl FrameworkVersion {
    /// Parses a dotted version of one to three numeric segments.
    pub fn parse(version: &str) -> Result<Self> {
        let raw = version.trim();
        let invalid = |reason: &str| FrameworkError::InvalidVersion {
            version: version.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("version is empty"));
        }

        let segments: Vec<&str> = raw.split('.').collect();
        if segments.len() > 3 {
            return Err(invalid("at most three segments are supported"));
        }

        let mut numbers = [0u64; 3];
        for (slot, segment) in numbers.iter_mut().zip(&segments) {
            if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid("segments must be non-negative integers"));
            }
            *slot = segment
                .parse()
                .map_err(|_| invalid("segment does not fit in 64 bits"))?;
        }

        Ok(Self {
            raw: raw.to_string(),
            parsed: semver::Version::new(numbers[0], numbers[1], numbers[2]),
        })
    }

    /// The major version, used to select the version helper.
    pub fn major(&self) -> u64 {
        self.parsed.major
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for FrameworkVersion {
    type Err = FrameworkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FrameworkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for FrameworkVersion {
    fn eq(&self, other: &Self) -> bool {
        self.parsed == other.parsed
    }
}

impl Eq for FrameworkVersion {}

impl PartialOrd for FrameworkVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrameworkVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed.cmp(&other.parsed)
    }
}

/// Windows NT kernel version, `major.minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct NtVersion {
    pub major: u32,
    pub minor: u32,
}

impl NtVersion {
    /// First NT version where `dism /enable-feature /all` is available (Windows 8 / 2012).
    pub const WINDOWS_8: NtVersion = NtVersion::new(6, 2);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl FromStr for NtVersion {
    type Err = FrameworkError;

    /// Accepts `6.3`, `6.3.9600` or `10.0.17763`; the build number is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || FrameworkError::InvalidVersion {
            version: s.to_string(),
            reason: "expected an NT version such as 6.3 or 10.0.17763".to_string(),
        };
        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        Ok(Self { major, minor })
    }
}

impl TryFrom<String> for NtVersion {
    type Error = FrameworkError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for NtVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> FrameworkVersion {
        FrameworkVersion::parse(s).unwrap()
    }

    #[test]
    fn missing_segments_are_zero() {
        assert_eq!(v("4.5"), v("4.5.0"));
        assert!(v("4.5") < v("4.5.1"));
        assert!(v("3.5") < v("4"));
    }

    #[test]
    fn segments_compare_numerically() {
        assert!(v("4.10") > v("4.9"));
        assert!(v("4.8") > v("4.7.2"));
        assert_eq!(v(" 4.6.2 ").to_string(), "4.6.2");
    }

    #[test]
    fn major_is_first_segment() {
        assert_eq!(v("4.5.2").major(), 4);
        assert_eq!(v("3.5").major(), 3);
    }

    #[test]
    fn rejects_non_numeric_and_long_versions() {
        for bad in ["", "4.x", "4..5", "4.5.2.1", "v4.5", "4.5-beta"] {
            assert!(
                matches!(
                    FrameworkVersion::parse(bad),
                    Err(FrameworkError::InvalidVersion { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn nt_version_ignores_build_number() {
        let win2019: NtVersion = "10.0.17763".parse().unwrap();
        assert_eq!(win2019, NtVersion::new(10, 0));
        assert!(win2019 >= NtVersion::WINDOWS_8);
        let win7: NtVersion = "6.1.7601".parse().unwrap();
        assert!(win7 < NtVersion::WINDOWS_8);
        assert!("ten".parse::<NtVersion>().is_err());
        assert!("6".parse::<NtVersion>().is_err());
    }
}
