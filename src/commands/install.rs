// This file contains the logic for the `setup-dotnet install` command.
// It builds the desired state from the resource file and flags, loads the
// package catalog, picks the version helper for the requested major version,
// detects the current state and runs the `install` action against the host.

use crate::cli::cmd_enums::InstallArgs;
use crate::libs::config_loading::{ResourceOverrides, load_catalog, resolve_resource};
use crate::libs::framework_installer::{InstallOutcome, install, load_current_state, unsupported, whyrun_supported};
use crate::libs::host::{DryRunHost, SystemHost, WindowsHost};
use crate::libs::version_helper::version_helper;
use crate::schemas::catalog::Catalog;
use crate::schemas::errors::FrameworkError;
use crate::schemas::framework::FrameworkResource;
use crate::{log_debug, log_info, log_warn};
use anyhow::{Context, Result};
use colored::Colorize;

/// Main entry point for the `install` command.
pub fn run(args: InstallArgs) -> Result<()> {
    log_debug!("Entered install::run() function.");

    let overrides = ResourceOverrides {
        version: args.version,
        feature_source: args.feature_source,
        no_patches: args.no_patches,
        package_sources: args
            .package_sources
            .into_iter()
            .map(|o| (o.checksum, o.source))
            .collect(),
        perform_reboot: flag_override(args.reboot, args.no_reboot),
        require_support: flag_override(args.require_support, args.no_require_support),
        timeout: args.timeout,
    };
    let resource = resolve_resource(args.config.as_deref(), &overrides)
        .context("Failed to determine the desired .NET Framework state")?;
    let catalog = load_catalog(args.catalog.as_deref()).context("Failed to load the package catalog")?;

    log_info!("[Framework] Converging {}", resource.name().bold());

    let outcome = if args.why_run && whyrun_supported() {
        log_info!("[Why-run] No changes will be made to this system");
        converge(&resource, &catalog, &DryRunHost::new(SystemHost::new()))?
    } else {
        converge(&resource, &catalog, &SystemHost::new())?
    };

    match outcome {
        InstallOutcome::Unsupported => {
            log_warn!("[Framework] Nothing done: .NET {} is not supported on this host", resource.version);
        }
        InstallOutcome::AlreadySatisfied { installed } => {
            log_info!("[Framework] Nothing to do: .NET {} is installed", installed.green());
        }
        InstallOutcome::Converged(report) => {
            if !report.skipped_packages.is_empty() {
                log_info!(
                    "[Packages] Already present and skipped: {}",
                    report.skipped_packages.join(", ").blue()
                );
            }
            log_info!("'setup-dotnet install' completed for {}", resource.name().bold().green());
        }
        InstallOutcome::RebootTriggered { reason, .. } => {
            log_warn!(
                "[Reboot] Rebooting for '{}'. Run 'setup-dotnet install' again afterwards to finish.",
                reason
            );
        }
    }
    log_debug!("Exited install::run() function.");
    Ok(())
}

/// Runs the `install` action for `resource` against `host`.
///
/// The major version is read from the leading digits of the requested
/// version. A version without one, or a major without a version helper,
/// counts as unsupported, so it follows the `require_support` rule like any
/// other unsupported version.
///
/// # Arguments
/// * `resource` - The desired state.
/// * `catalog` - The package catalog behind the version helpers.
/// * `host` - The machine to converge, real or why-run.
pub fn converge(resource: &FrameworkResource, catalog: &Catalog, host: &dyn WindowsHost) -> Result<InstallOutcome> {
    let Some(major) = resource.major_version() else {
        log_debug!("[Framework] '{}' has no major version", resource.version);
        return Ok(unsupported(resource)?);
    };

    let helper = match version_helper(host, catalog, major) {
        Ok(helper) => helper,
        Err(FrameworkError::UnknownMajorVersion(_)) => {
            log_debug!("[Framework] No version helper for major {}", major);
            return Ok(unsupported(resource)?);
        }
        Err(e) => return Err(e).context("Failed to query the host"),
    };

    let current = load_current_state(helper.as_ref()).context("Failed to detect the installed .NET version")?;
    Ok(install(resource, current.as_ref(), helper.as_ref(), host)?)
}

/// Turns a `--flag` / `--no-flag` pair into an override. Neither flag keeps
/// the resource file's value; clap rejects both at once.
fn flag_override(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
