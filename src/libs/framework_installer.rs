// This module converges one `.NET` framework resource.
//
// `load_current_state` reads what is installed; `install` is the single
// action. It refuses unsupported versions, does nothing when a newer version
// is already present, and otherwise applies, in order:
//
//   1. OS features
//   2. prerequisite packages
//   3. the main package
//   4. patches (when `include_patches` is set)
//
// After every feature and every package the reboot condition is re-checked,
// so a reboot required half way through is honored before continuing. A
// triggered reboot ends the run; the next run resumes from the detected state.

use crate::libs::host::{FeatureRequest, PackageRequest, WindowsHost};
use crate::libs::version_helper::VersionHelper;
use crate::logger::step_separator;
use crate::schemas::errors::{FrameworkError, Result};
use crate::schemas::framework::{CurrentState, FrameworkResource};
use crate::schemas::package::{PackageDescriptor, SUCCESS_CODES, SkipGuard};
use crate::schemas::version::{FrameworkVersion, NtVersion};
use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::time::Duration;

/// The install action always supports why-run; see `DryRunHost`.
pub const fn whyrun_supported() -> bool {
    true
}

/// What one run of the `install` action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The version is not supported on this host and support was not required.
    Unsupported,
    /// An equal or newer version is already installed.
    AlreadySatisfied { installed: String },
    /// Every step ran.
    Converged(InstallReport),
    /// A reboot was triggered; remaining steps were not run.
    RebootTriggered { report: InstallReport, reason: String },
}

/// Steps applied during one run, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub features: Vec<String>,
    pub installed_packages: Vec<String>,
    /// Packages whose skip guard reported them as present.
    pub skipped_packages: Vec<String>,
}

/// Detects the installed version for the helper's major.
pub fn load_current_state(helper: &dyn VersionHelper) -> Result<Option<CurrentState>> {
    let installed = helper.installed_version()?;
    log_debug!("[Framework] Installed version: {:?}", installed);
    Ok(installed.map(|version| CurrentState { version }))
}

/// `true` when the trimmed requested version is not one of the helper's
/// supported versions. The match is exact: `4.8` is supported, `4.8.0` is not.
pub fn is_unsupported(resource: &FrameworkResource, helper: &dyn VersionHelper) -> bool {
    !helper
        .supported_versions()
        .iter()
        .any(|supported| supported == resource.version.trim())
}

/// `true` when nothing is installed or the requested version is not older
/// than the installed one. An equal version still runs the steps so that
/// missing patches or features are applied.
pub fn install_required(resource: &FrameworkResource, current: Option<&CurrentState>) -> Result<bool> {
    match current {
        None => Ok(true),
        Some(current) => {
            let requested = resource.parsed_version()?;
            let installed = FrameworkVersion::parse(&current.version)?;
            Ok(requested >= installed)
        }
    }
}

/// `true` when reboots are allowed for this resource and the host has one pending.
pub fn should_reboot(resource: &FrameworkResource, host: &dyn WindowsHost) -> Result<bool> {
    Ok(resource.perform_reboot && host.reboot_pending()?)
}

/// Prerequisites, then the main package, then patches if enabled.
pub fn packages_for(resource: &FrameworkResource, helper: &dyn VersionHelper) -> Vec<PackageDescriptor> {
    let version = resource.version.trim();
    let mut packages = helper.prerequisites(version);
    packages.extend(helper.package(version));
    if resource.include_patches {
        packages.extend(helper.patches(version));
    }
    packages
}

/// Installer location: the `package_sources` override for the package's
/// checksum, otherwise its catalog URL.
pub fn package_source<'a>(resource: &'a FrameworkResource, package: &'a PackageDescriptor) -> &'a str {
    resource
        .package_sources
        .get(&package.checksum)
        .map(String::as_str)
        .unwrap_or(&package.url)
}

/// `true` when the guard says the package is already present.
pub fn evaluate_guard(guard: &SkipGuard, host: &dyn WindowsHost) -> Result<bool> {
    match guard {
        SkipGuard::Command(command) => host.run_guard_command(command),
        // No ids: nothing to look for, and no WMI query.
        SkipGuard::Hotfixes(ids) if ids.is_empty() => Ok(false),
        SkipGuard::Hotfixes(ids) => {
            let found = host.installed_hotfixes(ids)?;
            if !found.is_empty() {
                log_debug!("[Packages] Hotfixes present: {}", found.join(", "));
            }
            Ok(!found.is_empty())
        }
    }
}

/// Outcome for a version that cannot be installed on this host.
///
/// # Returns
/// * `Err(FrameworkError::UnsupportedVersion)` when `require_support` is set.
/// * `Ok(InstallOutcome::Unsupported)` otherwise, after logging the version.
pub fn unsupported(resource: &FrameworkResource) -> Result<InstallOutcome> {
    log_info!("Unsupported .NET version: {}", resource.version.yellow());
    if resource.require_support {
        return Err(FrameworkError::UnsupportedVersion(resource.version.clone()));
    }
    Ok(InstallOutcome::Unsupported)
}

/// The `install` action.
///
/// # Arguments
/// * `resource` - The desired state.
/// * `current` - The detected state, `None` when nothing is installed.
/// * `helper` - Version helper for the requested major.
/// * `host` - The machine to act on.
///
/// # Returns
/// * `Ok(InstallOutcome)` describing what was done.
/// * `Err(FrameworkError)` when support is required but missing, a version
///   cannot be parsed, or a host step fails.
pub fn install(
    resource: &FrameworkResource,
    current: Option<&CurrentState>,
    helper: &dyn VersionHelper,
    host: &dyn WindowsHost,
) -> Result<InstallOutcome> {
    // The support check runs before the requested version is parsed, so
    // strings like `4.x` are reported as unsupported rather than invalid.
    if is_unsupported(resource, helper) {
        return unsupported(resource);
    }

    if !install_required(resource, current)? {
        // `install_required` is only false when `current` is present.
        let installed = current.map(|c| c.version.clone()).unwrap_or_default();
        log_info!(
            ".NET `{}' is not needed because .NET `{}' is already installed",
            resource.version,
            installed.green()
        );
        return Ok(InstallOutcome::AlreadySatisfied { installed });
    }

    let mut report = InstallReport::default();

    if let Some(reason) = install_features(resource, helper, host, &mut report)? {
        return Ok(InstallOutcome::RebootTriggered { report, reason });
    }
    if let Some(reason) = install_packages(resource, helper, host, &mut report)? {
        return Ok(InstallOutcome::RebootTriggered { report, reason });
    }

    log_info!(
        "[Framework] {} converged ({} feature(s), {} package(s) installed, {} skipped)",
        resource.name().bold().green(),
        report.features.len(),
        report.installed_packages.len(),
        report.skipped_packages.len()
    );
    Ok(InstallOutcome::Converged(report))
}

/// Enables the version's optional features. `/All` is passed from Windows 8 on.
fn install_features(
    resource: &FrameworkResource,
    helper: &dyn VersionHelper,
    host: &dyn WindowsHost,
    report: &mut InstallReport,
) -> Result<Option<String>> {
    let features = helper.features(resource.version.trim());
    if features.is_empty() {
        log_debug!("[Features] No features for .NET {}", resource.version);
        return Ok(None);
    }

    let all = helper.nt_version() >= NtVersion::WINDOWS_8;
    for feature in &features {
        step_separator();
        log_info!("[Features] Enabling feature {}", feature.bold());
        host.install_feature(&FeatureRequest {
            name: feature,
            all,
            source: resource.feature_source.as_deref(),
        })?;
        report.features.push(feature.clone());

        if let Some(reason) = reboot_if_needed(resource, host, &format!("feature '{feature}'"))? {
            return Ok(Some(reason));
        }
    }
    Ok(None)
}

/// Installs prerequisites, the main package and patches, skipping the ones
/// whose guard finds them present.
fn install_packages(
    resource: &FrameworkResource,
    helper: &dyn VersionHelper,
    host: &dyn WindowsHost,
    report: &mut InstallReport,
) -> Result<Option<String>> {
    for package in packages_for(resource, helper) {
        step_separator();

        let present = match &package.not_if {
            Some(guard) => evaluate_guard(guard, host)?,
            None => false,
        };

        if present {
            log_info!("[Packages] Skipping {}: already present", package.name.blue());
            report.skipped_packages.push(package.name.clone());
        } else {
            let source = package_source(resource, &package);
            log_info!("[Packages] Installing {} from {}", package.name.bold(), source.cyan());
            let code = host.install_package(&PackageRequest {
                name: &package.name,
                source,
                checksum: &package.checksum,
                options: package.install_options(),
                timeout: Duration::from_secs(resource.timeout),
                success_codes: &SUCCESS_CODES,
            })?;
            // 3010 is a success that asks for a restart.
            if code != 0 {
                log_warn!("[Packages] {} finished with exit code {}", package.name, code);
            }
            report.installed_packages.push(package.name.clone());
        }

        if let Some(reason) = reboot_if_needed(resource, host, &format!("package '{}'", package.name))? {
            return Ok(Some(reason));
        }
    }
    Ok(None)
}

/// Reboots now when `should_reboot` holds.
///
/// # Returns
/// * `Some(reason)` when the host is going down and the run must stop.
/// * `None` when no reboot was needed, or the host only simulated one
///   (why-run) and the remaining steps should still be reported.
fn reboot_if_needed(resource: &FrameworkResource, host: &dyn WindowsHost, step: &str) -> Result<Option<String>> {
    if !should_reboot(resource, host)? {
        return Ok(None);
    }
    let reason = resource.name();
    log_warn!("[Reboot] Reboot for .NET {} {}", resource.version, step);
    // `reboot_now` reports whether the machine is really restarting.
    if host.reboot_now(&reason)? {
        return Ok(Some(reason));
    }
    Ok(None)
}
