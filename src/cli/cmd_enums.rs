use crate::cli::type_enums::PackageSourceOverride;
use clap::{Args, Parser, Subcommand};

/// Defines the command-line interface (CLI) for 'setup-dotnet'.
#[derive(Parser)]
#[command(name = "setup-dotnet", version)]
#[command(about = "Install a .NET Framework version on Windows, declaratively", long_about = None)]
pub struct Cli {
    /// Enables detailed debug output for troubleshooting.
    #[arg(short, long, global = true)]
    pub(crate) debug: bool,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current version of the tool.
    Version,
    /// Converge a .NET Framework resource: install the version unless it, or
    /// a newer one, is already present.
    Install(InstallArgs),
    /// Show the NT version, the installed .NET Framework version and whether
    /// a reboot is pending.
    Status(CatalogArgs),
    /// List the versions that can be installed on this host.
    Versions(CatalogArgs),
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Version to install (e.g. "4.8"). Overrides `version` from the resource file.
    pub version: Option<String>,

    /// Resource file (defaults to ~/.setup-dotnet/dotnet.yaml when it exists).
    #[arg(long, env = "SETUP_DOTNET_CONFIG")]
    pub config: Option<String>,

    /// Alternate source for OS features, e.g. D:\sources\sxs.
    #[arg(long)]
    pub feature_source: Option<String>,

    /// Do not install patches after the main package.
    #[arg(long)]
    pub no_patches: bool,

    /// Use a local or mirrored installer for the package with this checksum
    /// (CHECKSUM=PATH, repeatable).
    #[arg(long = "package-source", value_name = "CHECKSUM=PATH")]
    pub package_sources: Vec<PackageSourceOverride>,

    /// Reboot immediately whenever a step leaves a reboot pending.
    #[arg(long, conflicts_with = "no_reboot")]
    pub reboot: bool,

    /// Never reboot, even if the resource file sets `perform_reboot: true`.
    #[arg(long)]
    pub no_reboot: bool,

    /// Fail instead of skipping when the version is not supported on this host.
    #[arg(long, conflicts_with = "no_require_support")]
    pub require_support: bool,

    /// Skip unsupported versions, even if the resource file sets `require_support: true`.
    #[arg(long)]
    pub no_require_support: bool,

    /// Timeout in seconds for each package installer (default 600).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Package catalog to use instead of the embedded one.
    #[arg(long, env = "SETUP_DOTNET_CATALOG")]
    pub catalog: Option<String>,

    /// Report what would be done without changing the system.
    #[arg(long, visible_alias = "dry-run")]
    pub why_run: bool,
}

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Framework major version to inspect (e.g. 3 or 4).
    #[arg(long, default_value_t = 4)]
    pub major: u64,

    /// Package catalog to use instead of the embedded one.
    #[arg(long, env = "SETUP_DOTNET_CATALOG")]
    pub catalog: Option<String>,
}
