// This file contains the logic for the `setup-dotnet versions` command.
// It lists every version of a framework major version that the catalog
// supports on this host, together with what installing it involves.

use crate::cli::cmd_enums::CatalogArgs;
use crate::libs::config_loading::load_catalog;
use crate::libs::host::{SystemHost, WindowsHost};
use crate::libs::version_helper::{VersionHelper, version_helper};
use crate::log_info;
use crate::schemas::catalog::Catalog;
use crate::schemas::package::PackageDescriptor;
use crate::schemas::version::FrameworkVersion;
use anyhow::{Context, Result};
use colored::Colorize;
use prettytable::{Table, row};

pub fn run(args: CatalogArgs) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref()).context("Failed to load the package catalog")?;
    let host = SystemHost::new();
    let table = versions_table(&host, &catalog, args.major)?;

    if table.is_empty() {
        log_info!("[Versions] No .NET {}.x version is supported on this host", args.major);
        return Ok(());
    }
    log_info!("[Versions] .NET {}.x versions supported on NT {}:", args.major, host.nt_version()?.to_string().bold());
    table.printstd();
    Ok(())
}

/// One row per supported version, in ascending order.
pub fn versions_table(host: &dyn WindowsHost, catalog: &Catalog, major: u64) -> Result<Table> {
    let helper = version_helper(host, catalog, major)?;
    let installed = helper
        .installed_version()?
        .and_then(|v| FrameworkVersion::parse(&v).ok());

    let mut table = Table::new();
    table.set_titles(row!["Version", "Features", "Prerequisites", "Package", "Patches", "Installed"]);
    for version in helper.supported_versions() {
        table.add_row(row![
            version,
            or_dash(helper.features(&version).join(", ")),
            or_dash(names(&helper.prerequisites(&version))),
            package_label(helper.as_ref(), &version),
            or_dash(names(&helper.patches(&version))),
            installed_marker(installed.as_ref(), &version),
        ]);
    }
    Ok(table)
}

fn package_label(helper: &dyn VersionHelper, version: &str) -> String {
    match helper.package(version) {
        Some(package) => package.name,
        None => "(built in)".to_string(),
    }
}

/// `yes` for the installed version, `covered` for older ones it satisfies.
fn installed_marker(installed: Option<&FrameworkVersion>, version: &str) -> &'static str {
    let (Some(installed), Ok(version)) = (installed, FrameworkVersion::parse(version)) else {
        return "";
    };
    match installed.cmp(&version) {
        std::cmp::Ordering::Equal => "yes",
        std::cmp::Ordering::Greater => "covered",
        std::cmp::Ordering::Less => "",
    }
}

fn names(packages: &[PackageDescriptor]) -> String {
    packages.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
}

fn or_dash(value: String) -> String {
    if value.is_empty() { "-".to_string() } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::host::recording::RecordingHost;
    use crate::schemas::version::NtVersion;

    fn cell(table: &Table, row: usize, column: usize) -> String {
        table.get_row(row).unwrap().get_cell(column).unwrap().get_content()
    }

    #[test]
    fn lists_supported_versions_with_install_marker() {
        let catalog = load_catalog(None).unwrap();
        let host = RecordingHost::new()
            .with_nt(NtVersion::new(10, 0))
            .with_dword(r"HKLM\SOFTWARE\Microsoft\NET Framework Setup\NDP\v4\Full", "Release", 461814);

        let table = versions_table(&host, &catalog, 4).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(cell(&table, 0, 0), "4.5.2");
        assert_eq!(cell(&table, 0, 5), "covered");
        assert_eq!(cell(&table, 2, 0), "4.7.2");
        assert_eq!(cell(&table, 2, 5), "yes");
        assert_eq!(cell(&table, 3, 0), "4.8");
        assert_eq!(cell(&table, 3, 3), "Microsoft .NET Framework 4.8");
        assert_eq!(cell(&table, 3, 5), "");
    }

    #[test]
    fn feature_only_version_shows_built_in_package() {
        let catalog = load_catalog(None).unwrap();
        let host = RecordingHost::new().with_nt(NtVersion::new(6, 3));

        let table = versions_table(&host, &catalog, 3).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(cell(&table, 0, 1), "NetFx3");
        assert_eq!(cell(&table, 0, 2), "-");
        assert_eq!(cell(&table, 0, 3), "(built in)");
    }

    #[test]
    fn markers() {
        let installed = FrameworkVersion::parse("4.7.2").unwrap();
        assert_eq!(installed_marker(Some(&installed), "4.7.2"), "yes");
        assert_eq!(installed_marker(Some(&installed), "4.6.2"), "covered");
        assert_eq!(installed_marker(Some(&installed), "4.8"), "");
        assert_eq!(installed_marker(None, "4.8"), "");
    }
}
