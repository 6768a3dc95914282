//! # Framework Resource Schema
//!
//! The desired state of one `.NET` framework installation, as written in
//! `dotnet.yaml` and adjusted by command-line flags:
//!
//! ```yaml
//! version: "4.8"
//! include_patches: true
//! perform_reboot: true
//! timeout: 1200
//! feature_source: 'D:\sources\sxs'
//! package_sources:
//!   68c9986a8dcc0214d909aa1f31bee9fb5461bb839edca996a75b08ddffc1483f: '\\share\dotnet\ndp48-x86-x64-allos-enu.exe'
//! ```

use crate::schemas::errors::Result;
use crate::schemas::version::FrameworkVersion;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    600
}

/// Desired state. `version` is the identity of the resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkResource {
    /// Version to install, e.g. `4.5.2`. Its major part selects the version helper.
    pub version: String,

    /// Alternate source for OS features (passed to DISM as `/Source`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_source: Option<String>,

    /// Install the catalog's patches after the main package.
    #[serde(default = "default_true")]
    pub include_patches: bool,

    /// Local or mirrored locations for packages, keyed by package checksum.
    #[serde(default)]
    pub package_sources: HashMap<String, String>,

    /// Reboot immediately after any step that leaves a reboot pending.
    #[serde(default)]
    pub perform_reboot: bool,

    /// Fail instead of skipping when the version is not supported on this host.
    #[serde(default)]
    pub require_support: bool,

    /// Timeout in seconds for each package installer.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl FrameworkResource {
    /// A resource for `version` with every other property at its default.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            feature_source: None,
            include_patches: true,
            package_sources: HashMap::new(),
            perform_reboot: false,
            require_support: false,
            timeout: default_timeout(),
        }
    }

    pub fn parsed_version(&self) -> Result<FrameworkVersion> {
        FrameworkVersion::parse(&self.version)
    }

    /// Major version used to pick the version helper.
    ///
    /// Only the leading digits count, so `4.5.2`, `4.x` and `4.8-beta` all
    /// select major `4`. Whether the full string is a version the helper
    /// can install is decided later by the support check.
    ///
    /// # Returns
    /// * `Some(major)` for a version starting with digits.
    /// * `None` when there are no leading digits (`latest`, `v4.8`, empty).
    pub fn major_version(&self) -> Option<u64> {
        let trimmed = self.version.trim();
        // Length of the leading run of ASCII digits.
        let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
        trimmed[..digits].parse().ok()
    }

    /// Name used as the reboot reason, like the resource name in a run log.
    pub fn name(&self) -> String {
        format!(".NET Framework {}", self.version)
    }
}

/// State read from the host. `None` in place of this struct means
/// that no version of the requested major is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentState {
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_defaults() {
        let resource: FrameworkResource = serde_yaml::from_str("version: '4.6.2'").unwrap();
        assert_eq!(resource, FrameworkResource::new("4.6.2"));
        assert!(resource.include_patches);
        assert!(!resource.perform_reboot);
        assert!(!resource.require_support);
        assert_eq!(resource.timeout, 600);
        assert!(resource.package_sources.is_empty());
        assert_eq!(resource.feature_source, None);
    }

    #[test]
    fn yaml_overrides() {
        let yaml = r#"
version: "3.5"
feature_source: 'D:\sources\sxs'
include_patches: false
perform_reboot: true
require_support: true
timeout: 1800
package_sources:
  abc: 'C:\cache\abc.exe'
"#;
        let resource: FrameworkResource = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(resource.feature_source.as_deref(), Some(r"D:\sources\sxs"));
        assert!(!resource.include_patches);
        assert!(resource.perform_reboot);
        assert!(resource.require_support);
        assert_eq!(resource.timeout, 1800);
        assert_eq!(resource.package_sources["abc"], r"C:\cache\abc.exe");
        assert_eq!(resource.major_version(), Some(3));
    }

    #[test]
    fn major_comes_from_leading_digits() {
        assert_eq!(FrameworkResource::new("4.5.2").major_version(), Some(4));
        assert_eq!(FrameworkResource::new("4.x").major_version(), Some(4));
        assert_eq!(FrameworkResource::new("4.5.2.1").major_version(), Some(4));
        assert_eq!(FrameworkResource::new("4.8-beta").major_version(), Some(4));
        assert_eq!(FrameworkResource::new(" 10.0 ").major_version(), Some(10));
    }

    #[test]
    fn version_without_leading_digits_has_no_major() {
        assert_eq!(FrameworkResource::new("latest").major_version(), None);
        assert_eq!(FrameworkResource::new("v4.8").major_version(), None);
        assert_eq!(FrameworkResource::new("").major_version(), None);
        // Overflowing digit runs cannot name a helper either.
        assert_eq!(FrameworkResource::new("99999999999999999999999").major_version(), None);
    }
}
