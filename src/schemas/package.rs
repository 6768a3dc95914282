//! # Package Descriptors
//!
//! A package descriptor is one installer executable taken from the catalog:
//! a prerequisite, the main framework setup, or a patch. The same type is used
//! for all three so that they can be installed through a single code path.
//!
//! ```yaml
//! name: "Microsoft .NET Framework 4.5.2"
//! checksum: "6c2c589132e830a185c5f40f82042bee3022e721a216680bd9b3995ba86f3781"
//! url: "https://download.microsoft.com/.../NDP452-KB2901907-x86-x64-AllOS-ENU.exe"
//! not_if: ["KB2901907"]
//! ```

use serde::{Deserialize, Serialize};

/// Installer options used when a descriptor does not carry its own.
pub const DEFAULT_INSTALL_OPTIONS: &str = "/q /norestart";

/// Exit codes accepted as success for every package: `0` and `3010`
/// ("success, reboot required").
pub const SUCCESS_CODES: [i32; 2] = [0, 3010];

/// Condition under which a package is considered already present.
///
/// In YAML the field is either a string (a command) or a list of hotfix IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkipGuard {
    /// Skip the package when this command exits successfully.
    Command(String),
    /// Skip the package when any of these hotfixes (`KBxxxxxxx`) is
    /// reported by `Win32_QuickFixEngineering`. Some packages are delivered as
    /// updates on 2012 and later, or have been superseded by another update.
    Hotfixes(Vec<String>),
}

/// One installable package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Display name, also used in log lines and reboot reasons.
    pub name: String,

    /// SHA-256 of the installer. Also the key into `package_sources`.
    pub checksum: String,

    /// Download location of the installer.
    pub url: String,

    /// Command-line options for the installer. Defaults to `/q /norestart`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_if: Option<SkipGuard>,
}

impl PackageDescriptor {
    pub fn install_options(&self) -> &str {
        self.options.as_deref().unwrap_or(DEFAULT_INSTALL_OPTIONS)
    }
}
