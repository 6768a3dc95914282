// Loading of the resource file (`dotnet.yaml`) and the package catalog, and
// merging of command-line overrides into the desired state.

use crate::libs::paths::{expand_path, resolve_resource_path};
use crate::schemas::catalog::Catalog;
use crate::schemas::errors::{FrameworkError, Result};
use crate::schemas::framework::FrameworkResource;
use crate::{log_debug, log_info};
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Catalog compiled into the binary, used unless `--catalog` is given.
const EMBEDDED_CATALOG: &str = include_str!("../../catalog/dotnet.yaml");

/// Properties given on the command line. An unset flag (`false` or `None`)
/// leaves the resource file's value alone.
#[derive(Debug, Clone, Default)]
pub struct ResourceOverrides {
    pub version: Option<String>,
    pub feature_source: Option<String>,
    pub no_patches: bool,
    // Applied on top of the file's `package_sources`, replacing equal checksums.
    pub package_sources: Vec<(String, String)>,
    // `Some(false)` comes from `--no-reboot` and turns a file's `true` off.
    pub perform_reboot: Option<bool>,
    // `Some(false)` comes from `--no-require-support`.
    pub require_support: Option<bool>,
    pub timeout: Option<u64>,
}

impl ResourceOverrides {
    fn apply(&self, resource: &mut FrameworkResource) {
        if let Some(version) = &self.version {
            resource.version = version.clone();
        }
        if let Some(source) = &self.feature_source {
            resource.feature_source = Some(source.clone());
        }
        if self.no_patches {
            resource.include_patches = false;
        }
        for (checksum, source) in &self.package_sources {
            resource.package_sources.insert(checksum.clone(), source.clone());
        }
        if let Some(perform_reboot) = self.perform_reboot {
            resource.perform_reboot = perform_reboot;
        }
        if let Some(require_support) = self.require_support {
            resource.require_support = require_support;
        }
        if let Some(timeout) = self.timeout {
            resource.timeout = timeout;
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| FrameworkError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads one resource definition from a YAML file.
pub fn load_resource_file(path: &Path) -> Result<FrameworkResource> {
    log_debug!("[Config] Loading resource from {}", path.display().to_string().cyan());
    let contents = read_file(path)?;
    serde_yaml::from_str(&contents).map_err(|source| FrameworkError::ConfigParse {
        what: path.display().to_string(),
        source,
    })
}

/// Builds the desired state from the resource file (if any) and `overrides`.
///
/// # Arguments
/// * `config` - `--config` value. `None` falls back to the default resource
///   file, and to no file at all when that does not exist.
/// * `overrides` - Command-line values, applied last.
///
/// # Returns
/// * `Ok(resource)` with file values, then overrides, on top of the defaults.
/// * `Err(FrameworkError::MissingVersion)` when there is no resource file and
///   no version on the command line.
pub fn resolve_resource(config: Option<&str>, overrides: &ResourceOverrides) -> Result<FrameworkResource> {
    let mut resource = match resolve_resource_path(config) {
        Some(path) => {
            log_info!("[Config] Using resource file: {}", path.display().to_string().cyan());
            load_resource_file(&path)?
        }
        None => {
            let version = overrides.version.clone().ok_or(FrameworkError::MissingVersion)?;
            FrameworkResource::new(version)
        }
    };
    // Flags win over the file.
    overrides.apply(&mut resource);
    log_debug!("[Config] Desired state: {:#?}", resource);
    Ok(resource)
}

/// Loads the catalog from `path`, or the embedded catalog when `None`.
///
/// `path` may use `~` and `$VAR`.
pub fn load_catalog(path: Option<&str>) -> Result<Catalog> {
    match path {
        Some(path) => {
            let path = expand_path(path);
            log_info!("[Config] Using package catalog: {}", path.display().to_string().cyan());
            let contents = read_file(&path)?;
            parse_catalog(&contents, &path.display().to_string())
        }
        None => parse_catalog(EMBEDDED_CATALOG, "embedded catalog"),
    }
}

fn parse_catalog(contents: &str, what: &str) -> Result<Catalog> {
    serde_yaml::from_str(contents).map_err(|source| FrameworkError::ConfigParse {
        what: what.to_string(),
        source,
    })
}
