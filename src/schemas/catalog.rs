//! # Package Catalog Schema
//!
//! The catalog is the data behind the version helpers: for each framework
//! major version it says how to detect the installed version and which
//! features, prerequisites, main package and patches make up each release.
//!
//! ```yaml
//! majors:
//!   4:
//!     detection:
//!       type: release_key
//!       key: 'HKLM\SOFTWARE\Microsoft\NET Framework Setup\NDP\v4\Full'
//!       value: Release
//!       base_version: "4.0"
//!       releases:
//!         "4.5.2": 379893
//!     versions:
//!       "4.5.2":
//!         min_nt: "6.0"
//!         package: { name: ..., checksum: ..., url: ... }
//! ```

use crate::schemas::package::PackageDescriptor;
use crate::schemas::version::NtVersion;
use serde::Deserialize;
use std::collections::BTreeMap;

/// All majors known to the tool, keyed by major version number.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub majors: BTreeMap<u64, MajorCatalog>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MajorCatalog {
    pub detection: Detection,
    #[serde(default)]
    pub versions: BTreeMap<String, VersionEntry>,
}

/// How the installed version of a major is read from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Detection {
    /// A DWORD release number that grows with every version (`.NET 4.5` and later).
    /// The installed version is the highest one whose minimum release is met.
    /// If the key exists without the value, `base_version` is reported.
    ReleaseKey {
        key: String,
        value: String,
        releases: BTreeMap<String, u32>,
        #[serde(default)]
        base_version: Option<String>,
    },
    /// A DWORD flag equal to `1` when `version` is installed (`.NET 3.5`).
    InstallFlag {
        key: String,
        value: String,
        version: String,
    },
}

/// Everything needed to install one version.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionEntry {
    /// Oldest NT version the release supports.
    #[serde(default)]
    pub min_nt: Option<NtVersion>,

    /// Newest NT version the release can be installed on.
    #[serde(default)]
    pub max_nt: Option<NtVersion>,

    /// OS features to enable, in order.
    #[serde(default)]
    pub features: Vec<String>,

    /// Packages installed before the main package, in order.
    #[serde(default)]
    pub prerequisites: Vec<CatalogPackage>,

    #[serde(default)]
    pub package: Option<PackageDescriptor>,

    /// The main package ships with the OS starting at this NT version.
    #[serde(default)]
    pub builtin_from_nt: Option<NtVersion>,

    /// Packages installed after the main package, in order.
    #[serde(default)]
    pub patches: Vec<CatalogPackage>,
}

/// A prerequisite or patch, optionally limited to a range of NT versions
/// (e.g. servicing updates that only exist for Windows 8.1).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogPackage {
    #[serde(flatten)]
    pub package: PackageDescriptor,

    #[serde(default)]
    pub min_nt: Option<NtVersion>,

    #[serde(default)]
    pub max_nt: Option<NtVersion>,
}

impl CatalogPackage {
    pub fn applies_to(&self, nt: NtVersion) -> bool {
        within(nt, self.min_nt, self.max_nt)
    }
}

/// `true` when `nt` lies in the inclusive range; a missing bound is open.
fn within(nt: NtVersion, min: Option<NtVersion>, max: Option<NtVersion>) -> bool {
    min.is_none_or(|min| nt >= min) && max.is_none_or(|max| nt <= max)
}

impl VersionEntry {
    pub fn supports(&self, nt: NtVersion) -> bool {
        within(nt, self.min_nt, self.max_nt)
    }

    /// Prerequisites that apply to `nt`, in catalog order.
    pub fn prerequisites_for(&self, nt: NtVersion) -> Vec<PackageDescriptor> {
        applicable(&self.prerequisites, nt)
    }

    /// Patches that apply to `nt`, in catalog order.
    pub fn patches_for(&self, nt: NtVersion) -> Vec<PackageDescriptor> {
        applicable(&self.patches, nt)
    }

    /// The main package for `nt`, or `None` if the OS already ships it.
    pub fn package_for(&self, nt: NtVersion) -> Option<&PackageDescriptor> {
        match self.builtin_from_nt {
            Some(builtin) if nt >= builtin => None,
            _ => self.package.as_ref(),
        }
    }
}

fn applicable(packages: &[CatalogPackage], nt: NtVersion) -> Vec<PackageDescriptor> {
    packages
        .iter()
        .filter(|p| p.applies_to(nt))
        .map(|p| p.package.clone())
        .collect()
}
