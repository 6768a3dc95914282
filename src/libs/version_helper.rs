//! # Version Helpers
//!
//! A version helper answers every question the installer has about one
//! framework major version on the current host: what is installed, which
//! versions are supported on this OS, and which features, prerequisites,
//! package and patches make up a given version.
//!
//! Helpers are selected by major version with `version_helper`. The shipped
//! implementation, `CatalogVersionHelper`, reads its answers from the
//! package catalog and the registry.

use crate::libs::host::WindowsHost;
use crate::log_debug;
use crate::schemas::catalog::{Catalog, Detection, MajorCatalog, VersionEntry};
use crate::schemas::errors::{FrameworkError, Result};
use crate::schemas::package::PackageDescriptor;
use crate::schemas::version::{FrameworkVersion, NtVersion};
use colored::Colorize;
use std::collections::BTreeMap;

pub trait VersionHelper {
    /// NT version of the host this helper was created for.
    fn nt_version(&self) -> NtVersion;

    /// Installed version of this major, `None` if it is not installed.
    fn installed_version(&self) -> Result<Option<String>>;

    /// Versions that can be installed on this host, in ascending order.
    fn supported_versions(&self) -> Vec<String>;

    /// Main package, `None` when the OS ships the version or it needs none.
    fn package(&self, version: &str) -> Option<PackageDescriptor>;

    fn prerequisites(&self, version: &str) -> Vec<PackageDescriptor>;

    fn features(&self, version: &str) -> Vec<String>;

    fn patches(&self, version: &str) -> Vec<PackageDescriptor>;
}

/// Selects the helper for `major`.
///
/// # Arguments
/// * `host` - Queried for the NT version now and the registry later.
/// * `catalog` - Package catalog; each major has its own section.
/// * `major` - The framework major version, e.g. `4`.
///
/// # Returns
/// * `Ok(helper)` for a major present in the catalog.
/// * `Err(FrameworkError::UnknownMajorVersion)` for any other major.
pub fn version_helper<'a>(
    host: &'a dyn WindowsHost,
    catalog: &'a Catalog,
    major: u64,
) -> Result<Box<dyn VersionHelper + 'a>> {
    let major_catalog = catalog
        .majors
        .get(&major)
        .ok_or(FrameworkError::UnknownMajorVersion(major))?;
    let nt = host.nt_version()?;
    log_debug!("[Helper] Using catalog for .NET {} on NT {}", major, nt);
    Ok(Box::new(CatalogVersionHelper {
        nt,
        catalog: major_catalog,
        host,
    }))
}

pub struct CatalogVersionHelper<'a> {
    nt: NtVersion,
    catalog: &'a MajorCatalog,
    host: &'a dyn WindowsHost,
}

impl CatalogVersionHelper<'_> {
    /// Catalog entry for `version`, only if it is supported on this host.
    fn entry(&self, version: &str) -> Option<&VersionEntry> {
        self.catalog
            .versions
            .get(version)
            .filter(|entry| entry.supports(self.nt))
    }
}

impl VersionHelper for CatalogVersionHelper<'_> {
    fn nt_version(&self) -> NtVersion {
        self.nt
    }

    fn installed_version(&self) -> Result<Option<String>> {
        match &self.catalog.detection {
            Detection::ReleaseKey { key, value, releases, base_version } => {
                match self.host.registry_dword(key, value)? {
                    Some(release) => {
                        log_debug!("[Helper] {}\\{} = {}", key, value, release);
                        Ok(version_for_release(releases, release).or_else(|| base_version.clone()))
                    }
                    // 4.0 creates the key but writes no Release value.
                    None if self.host.registry_key_exists(key)? => Ok(base_version.clone()),
                    None => Ok(None),
                }
            }
            Detection::InstallFlag { key, value, version } => {
                let flag = self.host.registry_dword(key, value)?;
                log_debug!("[Helper] {}\\{} = {:?}", key, value, flag);
                Ok((flag == Some(1)).then(|| version.clone()))
            }
        }
    }

    fn supported_versions(&self) -> Vec<String> {
        let mut versions: Vec<&String> = self
            .catalog
            .versions
            .iter()
            .filter(|(_, entry)| entry.supports(self.nt))
            .map(|(version, _)| version)
            .collect();
        // Map order is lexical; `4.10` must sort after `4.9`.
        versions.sort_by_key(|v| FrameworkVersion::parse(v).ok());
        versions.into_iter().cloned().collect()
    }

    fn package(&self, version: &str) -> Option<PackageDescriptor> {
        self.entry(version)?.package_for(self.nt).cloned()
    }

    fn prerequisites(&self, version: &str) -> Vec<PackageDescriptor> {
        // Only those whose NT range covers this host.
        self.entry(version).map(|e| e.prerequisites_for(self.nt)).unwrap_or_default()
    }

    fn features(&self, version: &str) -> Vec<String> {
        self.entry(version).map(|e| e.features.clone()).unwrap_or_default()
    }

    fn patches(&self, version: &str) -> Vec<PackageDescriptor> {
        self.entry(version).map(|e| e.patches_for(self.nt)).unwrap_or_default()
    }
}

/// Highest version whose minimum release number is at most `release`.
pub fn version_for_release(releases: &BTreeMap<String, u32>, release: u32) -> Option<String> {
    releases
        .iter()
        .filter(|(_, minimum)| release >= **minimum)
        .filter_map(|(version, _)| FrameworkVersion::parse(version).ok())
        .max()
        .map(|version| version.to_string())
}
