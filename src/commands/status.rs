// This file contains the logic for the `setup-dotnet status` command.
// It reports the host's NT version, the installed version of the requested
// framework major version and whether a reboot is pending.

use crate::cli::cmd_enums::CatalogArgs;
use crate::libs::config_loading::load_catalog;
use crate::libs::framework_installer::load_current_state;
use crate::libs::host::{SystemHost, WindowsHost};
use crate::libs::version_helper::version_helper;
use crate::schemas::catalog::Catalog;
use crate::schemas::version::NtVersion;
use crate::{log_debug, log_info};
use anyhow::{Context, Result};
use colored::Colorize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub nt: NtVersion,
    pub major: u64,
    pub installed: Option<String>,
    pub reboot_pending: bool,
}

pub fn run(args: CatalogArgs) -> Result<()> {
    log_debug!("Entered status::run() function.");
    let catalog = load_catalog(args.catalog.as_deref()).context("Failed to load the package catalog")?;
    let report = collect_status(&SystemHost::new(), &catalog, args.major)?;

    log_info!("[Status] Windows NT version: {}", report.nt.to_string().bold());
    match &report.installed {
        Some(version) => log_info!("[Status] .NET Framework {}.x: {}", report.major, version.green()),
        None => log_info!("[Status] .NET Framework {}.x: {}", report.major, "not installed".yellow()),
    }
    if report.reboot_pending {
        log_info!("[Status] Reboot pending: {}", "yes".yellow());
    } else {
        log_info!("[Status] Reboot pending: {}", "no".green());
    }
    Ok(())
}

/// Queries the host for the NT version, the installed `major` version and
/// pending reboots.
pub fn collect_status(host: &dyn WindowsHost, catalog: &Catalog, major: u64) -> Result<StatusReport> {
    let helper = version_helper(host, catalog, major)?;
    let installed = load_current_state(helper.as_ref())?.map(|state| state.version);
    Ok(StatusReport {
        nt: helper.nt_version(),
        major,
        installed,
        reboot_pending: host.reboot_pending()?,
    })
}
